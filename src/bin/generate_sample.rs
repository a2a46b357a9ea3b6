use chrono::{Duration, NaiveDate};

/// Diurnal temperature curve in °F: coolest around 05:00, warmest around 17:00.
fn temperature_f(hour: f64, base: f64, swing: f64) -> f64 {
    base + swing * ((hour - 11.0) / 24.0 * std::f64::consts::TAU).sin()
}

/// Deterministic jitter in [-0.5, 0.5) so the two loggers don't overlap exactly.
fn jitter(step: u64, seed: u64) -> f64 {
    let x = step
        .wrapping_mul(6364136223846793005)
        .wrapping_add(seed)
        .rotate_left(17);
    (x >> 11) as f64 / (1u64 << 53) as f64 - 0.5
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let output_path = "sample_hobo.csv";
    let start = NaiveDate::from_ymd_opt(2019, 7, 15)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid start date"))?;
    let steps = 2 * 24 * 4; // two days, every 15 minutes

    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(std::fs::File::create(output_path)?);

    wtr.write_record(["Plot Title: 20001 "])?;
    wtr.write_record([
        "#",
        "Date Time, GMT-04:00",
        "Temp, °F (20001)",
        "RH, % (20001)",
        "Temp, °F (20002)",
        "Logged",
    ])?;

    for step in 0..steps {
        let ts = start + Duration::minutes(15 * step as i64);
        let hour = step as f64 / 4.0;

        let shed = round3(temperature_f(hour, 72.0, 9.0) + jitter(step, 1));
        let porch = round3(temperature_f(hour, 68.0, 12.0) + jitter(step, 2));
        let rh = round3(55.0 - 1.5 * (shed - 72.0) + jitter(step, 3));
        // the logger marks its first reading
        let logged = if step == 0 { "Logged" } else { "" };

        wtr.write_record([
            (step + 1).to_string(),
            ts.format("%m/%d/%y %I:%M:%S %p").to_string(),
            shed.to_string(),
            rh.to_string(),
            porch.to_string(),
            logged.to_string(),
        ])?;
    }
    wtr.flush()?;

    println!("Wrote {steps} readings from 2 loggers to {output_path}");
    Ok(())
}
