//! Fence BOM CLI - run a BOM calculation from a JSON request file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fence_bom::prelude::*;
use fence_bom::{parse_expression, transform};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fencebom")]
#[command(
    author,
    version,
    about = "Formula-driven BOM calculator for fence configurations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the calculation and print one line per component
    Calc {
        /// Calculation request file (JSON)
        input: PathBuf,

        /// Product style, overriding the one in the request
        #[arg(short, long)]
        style: Option<String>,

        /// Only execute these component codes (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        components: Option<Vec<String>>,

        /// Skip the project-level rounding post-pass
        #[arg(long)]
        no_project_rounding: bool,

        /// Emit results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Dry-run transform and parse for every resolved formula
    Check {
        /// Calculation request file (JSON)
        input: PathBuf,

        /// Product style, overriding the one in the request
        #[arg(short, long)]
        style: Option<String>,
    },

    /// Print the resolved template set in execution order
    Templates {
        /// Calculation request file (JSON)
        input: PathBuf,

        /// Product style, overriding the one in the request
        #[arg(short, long)]
        style: Option<String>,
    },
}

/// The four project inputs of one quote
#[derive(Debug, Deserialize)]
struct ProjectInputs {
    quantity: f64,
    #[serde(default)]
    lines: f64,
    #[serde(default)]
    gates: f64,
    #[serde(default)]
    height: f64,
}

/// A full calculation request: templates plus everything the context needs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalcRequest {
    product_type: String,
    #[serde(default)]
    style: Option<String>,
    inputs: ProjectInputs,
    #[serde(default)]
    variables: HashMap<String, ScopeValue>,
    #[serde(default)]
    style_adjustments: HashMap<String, ScopeValue>,
    #[serde(default)]
    materials: Vec<MaterialRecord>,
    #[serde(default)]
    sku_components: HashMap<String, String>,
    templates: Vec<FormulaTemplate>,
}

impl CalcRequest {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse request file {}", path.display()))
    }

    fn context(&self) -> CalculationContext {
        let mut ctx = CalculationContext::new(
            self.inputs.quantity,
            self.inputs.lines,
            self.inputs.gates,
            self.inputs.height,
        );
        for (name, value) in &self.variables {
            ctx.set_variable(name, value.clone());
        }
        for (name, value) in &self.style_adjustments {
            ctx.set_style_adjustment(name, value.clone());
        }
        ctx.load_material_attributes(
            self.sku_components
                .iter()
                .map(|(c, s)| (c.as_str(), s.as_str())),
            &self.materials,
        );
        ctx
    }

    fn engine(&self) -> BomCalculator<InMemoryTemplateStore> {
        BomCalculator::new(InMemoryTemplateStore::new(self.templates.clone()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calc {
            input,
            style,
            components,
            no_project_rounding,
            json,
        } => calc(&input, style, components, no_project_rounding, json),
        Commands::Check { input, style } => check(&input, style),
        Commands::Templates { input, style } => list_templates(&input, style),
    }
}

fn calc(
    input: &Path,
    style: Option<String>,
    components: Option<Vec<String>>,
    no_project_rounding: bool,
    json: bool,
) -> Result<()> {
    let request = CalcRequest::load(input)?;
    let style = style.or_else(|| request.style.clone());
    let engine = request.engine();
    let mut ctx = request.context();

    let filter: Option<Vec<&str>> = components
        .as_ref()
        .map(|codes| codes.iter().map(String::as_str).collect());

    let mut results = engine.calculate(
        &request.product_type,
        style.as_deref(),
        &mut ctx,
        filter.as_deref(),
    );

    if !no_project_rounding {
        apply_project_rounding(&mut results);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No formulas resolved for product type '{}'", request.product_type);
        return Ok(());
    }

    println!(
        "{:<14} {:>10} {:>12} {:<8} {}",
        "COMPONENT", "QTY", "RAW", "ROUND", "FORMULA"
    );
    for r in &results {
        println!(
            "{:<14} {:>10} {:>12.3} {:<8} {}",
            r.component_code, r.rounded_value, r.raw_value, r.rounding_level, r.formula
        );
    }
    Ok(())
}

fn check(input: &Path, style: Option<String>) -> Result<()> {
    let request = CalcRequest::load(input)?;
    let style = style.or_else(|| request.style.clone());
    let engine = request.engine();
    let ctx = request.context();

    let templates = engine
        .catalog()
        .load(&request.product_type, style.as_deref());

    let mut failures = 0usize;
    for template in templates.iter() {
        let outcome = transform(&template.formula, &ctx)
            .and_then(|expr| parse_expression(&expr).map(|_| expr));
        match outcome {
            Ok(expr) => println!("ok    {:<14} {}", template.component_code, expr),
            Err(e) => {
                failures += 1;
                println!("FAIL  {:<14} {}: {}", template.component_code, template.formula, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} formula(s) failed to transform or parse", failures);
    }
    println!("{} formula(s) ok", templates.len());
    Ok(())
}

fn list_templates(input: &Path, style: Option<String>) -> Result<()> {
    let request = CalcRequest::load(input)?;
    let style = style.or_else(|| request.style.clone());
    let engine = request.engine();

    let templates = engine
        .catalog()
        .load(&request.product_type, style.as_deref());

    if templates.is_empty() {
        println!("No formulas resolved for product type '{}'", request.product_type);
        return Ok(());
    }

    println!(
        "{:<14} {:<14} {:>8} {:<8} {}",
        "COMPONENT", "STYLE", "PRIORITY", "ROUND", "FORMULA"
    );
    for t in templates.iter() {
        println!(
            "{:<14} {:<14} {:>8} {:<8} {}",
            t.component_code,
            t.product_style_id.as_deref().unwrap_or("(generic)"),
            t.priority,
            t.rounding_level,
            t.formula
        );
    }
    Ok(())
}
