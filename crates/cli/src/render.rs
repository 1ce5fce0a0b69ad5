//! Plain-text rendering of migration steps.

use unicode_width::UnicodeWidthStr;
use unimigrate_types::MigrationStep;

const HEADERS: [&str; 5] = ["STEP", "KIND", "ID", "NAME", "REFERENCES"];

/// Render steps as a left-aligned table with one row per step.
pub fn render_table(steps: &[MigrationStep]) -> String {
    if steps.is_empty() {
        return "No migration steps.\n".to_string();
    }

    let rows: Vec<[String; 5]> = steps
        .iter()
        .map(|step| {
            let references = step
                .referenced_steps
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            [
                step.step_number.to_string(),
                step.object_type.to_string(),
                step.object_id.clone(),
                step.object_name.clone().unwrap_or_default(),
                references,
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut output = String::new();
    push_row(&mut output, &HEADERS.map(str::to_string), &widths);
    for row in &rows {
        push_row(&mut output, row, &widths);
    }
    output
}

fn push_row(output: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell}{}", " ".repeat(width.saturating_sub(cell.width()))))
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(line.trim_end());
    output.push('\n');
}
