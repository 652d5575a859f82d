//! Load the production estimator and price one laptop spec.
//!
//! Run `cargo run --example train_pipeline` first to populate the
//! production store, then: cargo run --example predict_price

use laptop_pricer::{DataFrame, ProductionStore};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let store = ProductionStore::new("workspace/production");
    let Some(estimator) = store.load_current()? else {
        eprintln!("no production model yet; run the train_pipeline example first");
        std::process::exit(1);
    };
    println!(
        "loaded production model ({}), expecting features: {:?}",
        estimator.algorithm(),
        estimator.feature_names()
    );

    // One raw spec record, exactly as a web form would submit it.
    let mut record = DataFrame::new();
    record.set_str("Product", vec!["Zenbook UX430".to_string()])?;
    record.set_num("Inches", vec![14.0])?;
    record.set_str(
        "ScreenResolution",
        vec!["IPS Panel Full HD 1920x1080".to_string()],
    )?;
    record.set_str("Cpu", vec!["Intel Core i7 8550U 1.8GHz".to_string()])?;
    record.set_str("Ram", vec!["16GB".to_string()])?;
    record.set_str("Memory", vec!["512GB SSD".to_string()])?;
    record.set_str("Gpu", vec!["Nvidia GeForce MX150".to_string()])?;
    record.set_str("OpSys", vec!["Windows 10".to_string()])?;
    record.set_str("Weight", vec!["1.25kg".to_string()])?;

    let prices = estimator.predict(&record, true)?;
    println!("predicted price: {:.0}", prices[0]);

    Ok(())
}
