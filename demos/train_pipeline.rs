//! End-to-end training run on synthetic laptop data.
//!
//! Demonstrates the full offline flow: schema validation, feature
//! engineering, declarative model tuning, the acceptance gate, and
//! promotion into the versioned production store.
//!
//! Run with: cargo run --example train_pipeline

use laptop_pricer::{DataFrame, DatasetSchema, ModelCatalog, TrainingPipeline};
use std::error::Error;

const SCHEMA_YAML: &str = r#"
target_column: Price
drop_columns: [Product]
numerical_columns: [Inches, Price]
categorical_columns:
  - Product
  - ScreenResolution
  - Cpu
  - Ram
  - Memory
  - Gpu
  - OpSys
  - Weight
"#;

const CATALOG_YAML: &str = r#"
search:
  strategy: grid
  cv: 3
candidates:
  - name: Ridge
    algorithm: ridge
    search_grid:
      alpha: [0.001, 0.1, 1.0, 10.0]
  - name: KNeighbors
    algorithm: knn
    search_grid:
      n_neighbors: [3, 5, 7]
  - name: DecisionTree
    algorithm: decision_tree
    search_grid:
      max_depth: [4, 6, 8]
      min_samples_leaf: [1, 3]
  - name: RandomForest
    algorithm: random_forest
    params:
      random_state: 42
    search_grid:
      n_estimators: [30, 60]
      max_depth: [6, 10]
"#;

/// Synthetic laptops whose price follows RAM, CPU tier, storage and panel.
fn synthetic_laptops(n: usize, offset: usize) -> DataFrame {
    let rams = [4u32, 8, 8, 16, 16, 32];
    let cpus = [
        ("Intel Core i3 6006U 2GHz", 0.0),
        ("Intel Core i5 7200U 2.5GHz", 1.0),
        ("Intel Core i7 8550U 1.8GHz", 2.2),
        ("Intel Celeron Dual Core N3350 1.1GHz", -0.5),
        ("AMD A9-Series 9420 3GHz", 0.3),
    ];
    let screens = [
        ("1366x768", 0.0),
        ("Full HD 1920x1080", 0.4),
        ("IPS Panel Full HD 1920x1080", 0.7),
        ("IPS Panel Touchscreen 2560x1440", 1.2),
    ];
    let storages = [
        ("500GB HDD", 0.0),
        ("128GB SSD", 0.6),
        ("256GB SSD", 0.9),
        ("256GB SSD + 1TB HDD", 1.3),
    ];
    let gpus = [
        "Intel HD Graphics 620",
        "Intel UHD Graphics 620",
        "Nvidia GeForce GTX 1050",
        "AMD Radeon 530",
    ];
    let oses = ["Windows 10", "Windows 10", "Linux", "No OS", "macOS"];

    let mut df = DataFrame::new();
    let mut product = Vec::new();
    let mut inches = Vec::new();
    let mut screen = Vec::new();
    let mut cpu = Vec::new();
    let mut ram = Vec::new();
    let mut memory = Vec::new();
    let mut gpu = Vec::new();
    let mut os = Vec::new();
    let mut weight = Vec::new();
    let mut price = Vec::new();

    for i in offset..offset + n {
        let ram_gb = rams[i % rams.len()];
        let (cpu_desc, cpu_tier) = cpus[i % cpus.len()];
        let (screen_desc, screen_tier) = screens[i % screens.len()];
        let (storage_desc, storage_tier) = storages[i % storages.len()];

        product.push(format!("Laptop Model {}", i));
        inches.push(13.3 + (i % 4) as f64);
        screen.push(screen_desc.to_string());
        cpu.push(cpu_desc.to_string());
        ram.push(format!("{}GB", ram_gb));
        memory.push(storage_desc.to_string());
        gpu.push(gpus[i % gpus.len()].to_string());
        os.push(oses[i % oses.len()].to_string());
        weight.push(format!("{:.2}kg", 1.1 + (i % 6) as f64 * 0.25));

        let base = 16000.0
            + 2200.0 * f64::from(ram_gb)
            + 11000.0 * cpu_tier
            + 6000.0 * screen_tier
            + 9000.0 * storage_tier;
        price.push(base);
    }

    df.set_str("Product", product).unwrap();
    df.set_num("Inches", inches).unwrap();
    df.set_str("ScreenResolution", screen).unwrap();
    df.set_str("Cpu", cpu).unwrap();
    df.set_str("Ram", ram).unwrap();
    df.set_str("Memory", memory).unwrap();
    df.set_str("Gpu", gpu).unwrap();
    df.set_str("OpSys", os).unwrap();
    df.set_str("Weight", weight).unwrap();
    df.set_num("Price", price).unwrap();
    df
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    println!("=== Laptop Price Training Pipeline ===\n");

    let schema = DatasetSchema::from_yaml_str(SCHEMA_YAML)?;
    let catalog = ModelCatalog::from_yaml_str(CATALOG_YAML)?;

    let train = synthetic_laptops(120, 0);
    let validation = synthetic_laptops(40, 120);
    println!(
        "training rows: {}, validation rows: {}",
        train.n_rows(),
        validation.n_rows()
    );

    let pipeline =
        TrainingPipeline::new(schema, catalog, "workspace").with_expected_score(0.6);
    let outcome = pipeline.run(&train, &validation)?;

    println!("\nbest candidate : {}", outcome.best_name);
    println!("best params    : {:?}", outcome.record.best_params);
    println!("cv r2          : {:.4}", outcome.record.cv_score);
    println!("train r2       : {:.4}", outcome.record.train_score);
    println!("test  r2       : {:.4}", outcome.record.test_metrics.r2_score);
    println!("test  mae      : {:.4}", outcome.record.test_metrics.mean_absolute_error);
    println!("test  mse      : {:.4}", outcome.record.test_metrics.mean_squared_error);
    println!("\nfull report    : {}", outcome.report_path.display());
    println!("bundle         : {}", outcome.estimator_path.display());
    if outcome.promoted {
        println!(
            "promoted to production version {}",
            outcome.production_version.unwrap_or_default()
        );
    } else {
        println!("not promoted: production model is at least as good");
    }

    Ok(())
}
