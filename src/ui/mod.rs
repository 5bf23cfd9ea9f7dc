pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    created, deleted, empty, error, header, info, section, success, summary_row, updated,
};
pub use table::{rows_table, stats_table, TableBuilder};
pub use theme::theme;
