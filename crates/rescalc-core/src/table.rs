use std::io::{self, Write};

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Color, Table};
use itertools::Itertools;

use crate::params::ConnectionMode;
use crate::search::{Combination, Connection, SearchResults};
use crate::value::format_ohms;

/// Errors below this are shown as exact matches
const EXACT_MATCH_PERCENT: f64 = 1e-9;

fn describe_members(combo: &Combination, connection: Connection) -> String {
    combo
        .members
        .iter()
        .map(|&r| format_ohms(r))
        .join(connection.separator())
}

fn heading(connection: Connection) -> &'static str {
    match connection {
        Connection::Series => "Series combinations",
        Connection::Parallel => "Parallel combinations",
    }
}

impl SearchResults {
    /// Write one table per connection type in `mode`, each limited to the
    /// best `limit` entries (all of them when `limit` is `None`).
    pub fn write_table<W: Write>(
        &self,
        mode: ConnectionMode,
        limit: Option<usize>,
        mut writer: W,
    ) -> io::Result<()> {
        let connections = Connection::ALL.into_iter().filter(|c| match c {
            Connection::Series => mode.includes_series(),
            Connection::Parallel => mode.includes_parallel(),
        });

        for (i, connection) in connections.enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }

            let combos = self.get(connection);
            writeln!(writer, "{}", heading(connection).blue().bold())?;
            if combos.is_empty() {
                writeln!(
                    writer,
                    "{}",
                    format!("No {connection} combination found within tolerance").dimmed()
                )?;
                continue;
            }

            let shown = limit.unwrap_or(combos.len()).min(combos.len());

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
            table.set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
            table.set_header(vec!["#", "Resistors (Ω)", "Total (Ω)", "Error (%)"]);

            for (idx, combo) in combos.iter().take(shown).enumerate() {
                let error_cell = Cell::new(format!("{:.1}", combo.error_percent))
                    .set_alignment(CellAlignment::Right);
                let error_cell = if combo.error_percent < EXACT_MATCH_PERCENT {
                    error_cell.fg(Color::Green)
                } else {
                    error_cell
                };

                table.add_row(vec![
                    Cell::new(idx + 1),
                    Cell::new(describe_members(combo, connection)),
                    Cell::new(format!("{:.1}", combo.total)).set_alignment(CellAlignment::Right),
                    error_cell,
                ]);
            }

            writeln!(writer, "{table}")?;

            if shown < combos.len() {
                writeln!(
                    writer,
                    "{}",
                    format!("Showing {} of {} combinations", shown, combos.len()).dimmed()
                )?;
            }
        }

        Ok(())
    }
}
