#![allow(dead_code)]

use std::io::Write;

use censo_bairros::engine::columns;
use censo_bairros::engine::HouseholdType;

pub const AGE_BANDS: [&str; 3] = ["0 a 4 anos", "5 a 9 anos", "10 a 14 anos"];

/// One fixture neighborhood.
pub struct Bairro {
    pub code: i64,
    pub name: &'static str,
    pub population: i64,
    pub male: i64,
    pub female: i64,
    pub income: f64,
}

pub fn bairro(code: i64, name: &'static str, population: i64, income: f64) -> Bairro {
    Bairro {
        code,
        name,
        population,
        male: population / 2,
        female: population - population / 2,
        income,
    }
}

/// Header of the full fixture table, in source order.
pub fn full_header() -> Vec<String> {
    let mut cols: Vec<String> = columns::REQUIRED.iter().map(|c| c.to_string()).collect();
    for band in AGE_BANDS {
        cols.push(format!("Sexo masculino, {band}"));
        cols.push(format!("Sexo feminino, {band}"));
    }
    cols.extend(HouseholdType::ALL.iter().map(|k| k.column().to_string()));
    cols.push(columns::RESPONSIBLE_PERSONS.to_string());
    cols.push(columns::HOUSEHOLD_RESIDENTS.to_string());
    cols.push(columns::AVERAGE_INCOME.to_string());
    cols.push(columns::INCOME_VARIANCE.to_string());
    cols
}

fn full_row(b: &Bairro) -> Vec<String> {
    let mut cells = vec![
        b.code.to_string(),
        b.name.to_string(),
        b.population.to_string(),
        b.male.to_string(),
        b.female.to_string(),
    ];
    for (i, _) in AGE_BANDS.iter().enumerate() {
        cells.push((10 + i).to_string());
        cells.push((20 + i).to_string());
    }
    for (i, _) in HouseholdType::ALL.iter().enumerate() {
        cells.push(((i + 1) * 5).to_string());
    }
    cells.push((b.population / 3).to_string());
    cells.push(b.population.to_string());
    cells.push(format!("{:.2}", b.income));
    cells.push("250000".to_string());
    cells
}

/// CSV text with the full header, minus any column named in `drop`.
pub fn csv_table(bairros: &[Bairro], drop: &[&str]) -> String {
    let header = full_header();
    let keep: Vec<usize> = (0..header.len())
        .filter(|&i| !drop.contains(&header[i].as_str()))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(keep.iter().map(|&i| header[i].as_str()))
        .unwrap();
    for b in bairros {
        let row = full_row(b);
        writer
            .write_record(keep.iter().map(|&i| row[i].as_str()))
            .unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

pub fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
