use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use censo_bairros::engine::columns;
use censo_bairros::engine::HouseholdType;

/// Write a synthetic census table as CSV and Parquet.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", about)]
struct Cli {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const BAIRROS: [&str; 8] = [
    "Centro",
    "Copacabana",
    "Botafogo",
    "Tijuca",
    "Méier",
    "Madureira",
    "Campo Grande",
    "Santa Teresa",
];

const AGE_BANDS: [&str; 10] = [
    "0 a 4 anos",
    "5 a 9 anos",
    "10 a 14 anos",
    "15 a 19 anos",
    "20 a 29 anos",
    "30 a 39 anos",
    "40 a 49 anos",
    "50 a 59 anos",
    "60 a 69 anos",
    "70 anos ou mais",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo) as f64) as i64
    }
}

/// One synthetic neighborhood; column order matches `header()`.
struct Row {
    code: i64,
    name: String,
    male_bands: Vec<i64>,
    female_bands: Vec<i64>,
    households: Vec<i64>,
    income: f64,
    variance: f64,
}

impl Row {
    fn generate(code: i64, name: &str, rng: &mut SimpleRng) -> Row {
        let scale = rng.range(200, 2000);
        let mut band = || rng.range(scale / 2, scale);
        let male_bands: Vec<i64> = AGE_BANDS.iter().map(|_| band()).collect();
        let female_bands: Vec<i64> = AGE_BANDS.iter().map(|_| band()).collect();
        let households = HouseholdType::ALL
            .iter()
            .map(|_| rng.range(0, scale * 2))
            .collect();
        let income = 1200.0 + rng.next_f64() * 9000.0;
        let variance = (income * (0.2 + rng.next_f64())).powi(2);
        Row {
            code,
            name: name.to_string(),
            male_bands,
            female_bands,
            households,
            income: (income * 100.0).round() / 100.0,
            variance: variance.round(),
        }
    }

    fn male(&self) -> i64 {
        self.male_bands.iter().sum()
    }

    fn female(&self) -> i64 {
        self.female_bands.iter().sum()
    }

    fn responsible(&self) -> i64 {
        self.households.iter().sum()
    }

    fn integers(&self) -> Vec<i64> {
        let mut v = vec![self.male() + self.female(), self.male(), self.female()];
        v.extend(&self.male_bands);
        v.extend(&self.female_bands);
        v.extend(&self.households);
        v.push(self.responsible());
        v.push(self.male() + self.female());
        v
    }
}

/// Integer column names after the code/name pair, then the two float columns.
fn integer_columns() -> Vec<String> {
    let mut cols = vec![
        columns::POPULATION.to_string(),
        columns::MALE.to_string(),
        columns::FEMALE.to_string(),
    ];
    cols.extend(AGE_BANDS.iter().map(|b| format!("{}, {b}", columns::MALE)));
    cols.extend(AGE_BANDS.iter().map(|b| format!("{}, {b}", columns::FEMALE)));
    cols.extend(HouseholdType::ALL.iter().map(|k| k.column().to_string()));
    cols.push(columns::RESPONSIBLE_PERSONS.to_string());
    cols.push(columns::HOUSEHOLD_RESIDENTS.to_string());
    cols
}

fn write_csv(path: &PathBuf, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    let mut header = vec![columns::CODE.to_string(), columns::NAME.to_string()];
    header.extend(integer_columns());
    header.push(columns::AVERAGE_INCOME.to_string());
    header.push(columns::INCOME_VARIANCE.to_string());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.code.to_string(), row.name.clone()];
        record.extend(row.integers().iter().map(i64::to_string));
        record.push(format!("{:.2}", row.income));
        record.push(format!("{:.0}", row.variance));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &PathBuf, rows: &[Row]) -> Result<()> {
    let int_cols = integer_columns();

    let mut fields = vec![
        Field::new(columns::CODE, DataType::Int64, false),
        Field::new(columns::NAME, DataType::Utf8, false),
    ];
    fields.extend(int_cols.iter().map(|c| Field::new(c, DataType::Int64, false)));
    fields.push(Field::new(columns::AVERAGE_INCOME, DataType::Float64, true));
    fields.push(Field::new(columns::INCOME_VARIANCE, DataType::Float64, true));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.code))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
    ];
    let per_row: Vec<Vec<i64>> = rows.iter().map(Row::integers).collect();
    for col in 0..int_cols.len() {
        arrays.push(Arc::new(Int64Array::from_iter_values(
            per_row.iter().map(|values| values[col]),
        )));
    }
    arrays.push(Arc::new(Float64Array::from_iter_values(
        rows.iter().map(|r| r.income),
    )));
    arrays.push(Arc::new(Float64Array::from_iter_values(
        rows.iter().map(|r| r.variance),
    )));

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);

    let rows: Vec<Row> = BAIRROS
        .iter()
        .enumerate()
        .map(|(i, name)| Row::generate(3304557001 + i as i64, name, &mut rng))
        .collect();

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating {}", cli.out.display()))?;
    let csv_path = cli.out.join("censo_bairros.csv");
    let parquet_path = cli.out.join("censo_bairros.parquet");
    write_csv(&csv_path, &rows)?;
    write_parquet(&parquet_path, &rows)?;

    log::info!("sample seed {}", cli.seed);
    println!(
        "Wrote {} neighborhoods to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
