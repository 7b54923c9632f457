//! Minimal CSV tokenizer: comma separated, double-quoted fields with `""`
//! escapes, quoted fields may span lines. Blank lines are dropped.

use std::mem;

pub fn split_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(mem::take(&mut field));
                push_record(&mut records, mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    // Final line without a trailing newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }
    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}
