use crate::model::Table;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

pub fn created(table: Table, id: i64) {
    println!("{} {} #{}", Icons::NEW.style(theme().success.clone()), table, id);
}

pub fn updated(table: Table, id: i64) {
    println!("{} {} #{}", Icons::MOD.style(theme().warn.clone()), table, id);
}

pub fn deleted(table: Table, count: usize) {
    println!("{} {} row(s) from {}", Icons::DEL.style(theme().error.clone()), count, table);
}

pub fn empty(table: Table) {
    println!("{} No rows in {}", Icons::EMPTY, table);
}
