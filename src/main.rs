use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use censo_bairros::data::loader::load_file;
use censo_bairros::{DashboardReport, FilterSelection, LoaderConfig, NeighborhoodReport, Session};

/// Census dashboard in the terminal: load a table, pick neighborhoods,
/// print the derived figures.
#[derive(Parser, Debug)]
#[command(name = "censo-bairros", version, about, long_about = None)]
struct Cli {
    /// Census table (.csv, .json, .parquet or a spreadsheet workbook)
    path: PathBuf,

    /// Neighborhood name to analyze (repeatable)
    #[arg(short, long = "bairro")]
    bairros: Vec<String>,

    /// Neighborhood code to analyze (repeatable)
    #[arg(short = 'c', long = "codigo")]
    codigos: Vec<String>,

    /// Loader configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the neighborhood names and exit
    #[arg(long)]
    list: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LoaderConfig::from_json_file(path)?,
        None => LoaderConfig::default(),
    };
    let dataset = load_file(&cli.path, &config)
        .with_context(|| format!("loading {}", cli.path.display()))?;

    if cli.list {
        for name in dataset.neighborhood_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut session = Session::new(dataset);
    let mut selection = FilterSelection::by_names(cli.bairros);
    for codigo in cli.codigos {
        selection.add_code(codigo);
    }
    session.set_selection(selection);
    let report = session.report();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report)?);
    }
    Ok(())
}

/// Render a report as the plain-text dashboard.
fn render_text(report: &DashboardReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let city = &report.city;
    writeln!(out, "== Cidade ==")?;
    writeln!(out, "População total:     {:>12.0}", city.total_population)?;
    writeln!(out, "Sexo masculino:      {:>12.0}", city.total_male)?;
    writeln!(out, "Sexo feminino:       {:>12.0}", city.total_female)?;
    match city.mean_income {
        Some(v) => writeln!(out, "Renda média mensal:  {v:>12.2}")?,
        None => writeln!(out, "Renda média mensal:  indisponível")?,
    }
    for diagnostic in &city.diagnostics {
        writeln!(out, "  aviso: {diagnostic}")?;
    }

    writeln!(out, "-- População x renda por bairro --")?;
    for row in &city.by_neighborhood {
        writeln!(
            out,
            "{:<28}{:>12.0}{:>14}",
            row.name,
            row.population,
            optional_amount(row.mean_income)
        )?;
    }
    if let Some(dispersion) = &city.income_dispersion {
        writeln!(out, "-- Renda x variância por bairro --")?;
        for row in dispersion {
            writeln!(
                out,
                "{:<28}{:>14}{:>18}",
                row.name,
                optional_amount(row.mean_income),
                optional_amount(row.mean_variance)
            )?;
        }
    }

    if report.selection_empty {
        writeln!(out)?;
        writeln!(
            out,
            "Selecione um ou mais bairros (--bairro / --codigo) para a análise detalhada."
        )?;
        return Ok(out);
    }
    if report.selection_unmatched() {
        writeln!(out)?;
        writeln!(out, "Nenhum bairro corresponde à seleção.")?;
        return Ok(out);
    }
    for neighborhood in &report.neighborhoods {
        writeln!(out)?;
        render_neighborhood(&mut out, neighborhood)?;
    }
    for error in &report.errors {
        writeln!(out, "erro: {error}")?;
    }
    Ok(out)
}

fn optional_amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn render_neighborhood(out: &mut String, report: &NeighborhoodReport) -> std::fmt::Result {
    let snap = &report.snapshot;
    writeln!(out, "== Bairro: {} ({}) ==", snap.name, snap.code)?;
    writeln!(out, "População total:     {:>12.0}", snap.population)?;
    writeln!(out, "Sexo masculino:      {:>12.0}", snap.male)?;
    writeln!(out, "Sexo feminino:       {:>12.0}", snap.female)?;

    let optional = [
        ("Pessoas responsáveis", snap.responsible_persons),
        ("Moradores/domicílio", snap.household_residents),
        ("Renda média mensal", snap.average_income),
        ("Variância da renda", snap.income_variance),
    ];
    for (label, value) in optional {
        writeln!(out, "{label:<21}{:>12}", optional_amount(value))?;
    }
    for diagnostic in &snap.diagnostics {
        writeln!(out, "  aviso: {diagnostic}")?;
    }

    if let (Some(m), Some(f)) = (report.sex_split.male_share(), report.sex_split.female_share()) {
        writeln!(out, "Masculino/Feminino:  {:>5.1}% / {:.1}%", m * 100.0, f * 100.0)?;
    }

    writeln!(out, "-- Faixa etária (masc / fem) --")?;
    for band in &report.age_sex.bands {
        writeln!(out, "{:<28}{:>9.0}{:>9.0}", band.label, band.male, band.female)?;
    }
    for diagnostic in &report.age_sex.diagnostics {
        writeln!(out, "  aviso: {diagnostic}")?;
    }

    writeln!(out, "-- Domicílios particulares --")?;
    match &report.households {
        Ok(dist) => {
            for (kind, count) in &dist.counts {
                let share = dist.share(*kind).unwrap_or(0.0) * 100.0;
                writeln!(out, "{:<28}{count:>9.0}{share:>8.1}%", kind.label())?;
            }
        }
        Err(e) => writeln!(out, "  erro ao gerar a distribuição: {e}")?,
    }
    Ok(())
}
