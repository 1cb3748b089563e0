//! Writes a small synthetic air-quality dataset and a matching model:
//!
//! * `air_quality.csv`               – raw table with `wd` / `station` labels
//! * `air_quality_numerical.csv`     – same rows, labels replaced by codes
//! * `air_quality_numerical.parquet` – Parquet copy of the numeric table
//! * `model.json`                    – linear PM2.5 regressor

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

const STATIONS: [&str; 3] = ["Aotizhongxin", "Changping", "Dingling"];
const WIND_DIRECTIONS: [&str; 16] = [
    "E", "ENE", "ESE", "N", "NE", "NNE", "NNW", "NW", "S", "SE", "SSE", "SSW", "SW", "W", "WNW",
    "WSW",
];
const HOURS_PER_STATION: usize = 240;
const MISSING_RATE: f64 = 0.02;

const READINGS: [&str; 11] = [
    "PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP", "PRES", "DEWP", "RAIN", "WSPM",
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

/// One hourly observation.
struct Observation {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    readings: [Option<f64>; 11],
    wd: usize,
    station: usize,
}

fn simulate(rng: &mut SimpleRng) -> Vec<Observation> {
    let mut rows = Vec::with_capacity(STATIONS.len() * HOURS_PER_STATION);
    for station in 0..STATIONS.len() {
        let urban = 1.0 - station as f64 * 0.2;
        for h in 0..HOURS_PER_STATION {
            let hour = (h % 24) as i64;
            let day = (h / 24) as i64 + 1;
            let diurnal = (2.0 * std::f64::consts::PI * hour as f64 / 24.0).sin();

            let temp = rng.gauss(2.0 + 6.0 * diurnal, 2.0);
            let pres = rng.gauss(1020.0 - 0.5 * temp, 3.0);
            let dewp = temp - rng.gauss(12.0, 3.0).abs();
            let wspm = rng.gauss(2.0, 1.0).abs();
            let rain = if rng.next_f64() < 0.05 {
                rng.gauss(1.0, 0.5).abs()
            } else {
                0.0
            };
            let co = rng.gauss(900.0 * urban, 200.0).max(100.0);
            let no2 = rng.gauss(50.0 * urban, 12.0).max(2.0);
            let so2 = rng.gauss(15.0 * urban, 5.0).max(1.0);
            let o3 = rng.gauss(40.0 + 20.0 * diurnal, 10.0).max(1.0);
            let pm10 = rng.gauss(110.0 * urban - 8.0 * wspm, 25.0).max(5.0);
            let pm25 = (0.6 * pm10 + 0.02 * co - 2.0 * wspm + rng.gauss(0.0, 8.0)).max(3.0);

            let values = [pm25, pm10, so2, no2, co, o3, temp, pres, dewp, rain, wspm];
            let mut readings = [None; 11];
            for (slot, value) in readings.iter_mut().zip(values) {
                if rng.next_f64() >= MISSING_RATE {
                    *slot = Some((value * 10.0).round() / 10.0);
                }
            }

            rows.push(Observation {
                year: 2013,
                month: 3,
                day,
                hour,
                readings,
                wd: rng.index(WIND_DIRECTIONS.len()),
                station,
            });
        }
    }
    rows
}

fn fmt_reading(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv(path: &str, rows: &[Observation], encoded: bool) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    let mut header = vec!["No", "year", "month", "day", "hour"];
    header.extend(&READINGS[..10]);
    header.extend(["wd", "WSPM", "station"]);
    writer.write_record(&header)?;

    for (no, row) in rows.iter().enumerate() {
        let mut record = vec![
            (no + 1).to_string(),
            row.year.to_string(),
            row.month.to_string(),
            row.day.to_string(),
            row.hour.to_string(),
        ];
        record.extend(row.readings[..10].iter().map(|v| fmt_reading(*v)));
        if encoded {
            record.push(row.wd.to_string());
            record.push(fmt_reading(row.readings[10]));
            record.push(row.station.to_string());
        } else {
            record.push(WIND_DIRECTIONS[row.wd].to_string());
            record.push(fmt_reading(row.readings[10]));
            record.push(STATIONS[row.station].to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Observation]) -> Result<()> {
    let mut fields = vec![
        Field::new("hour", DataType::Int64, false),
        Field::new("wd", DataType::Int64, false),
        Field::new("station", DataType::Int64, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.hour))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.wd as i64))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.station as i64))),
    ];
    for (idx, name) in READINGS.iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.readings[idx]).collect::<Vec<_>>(),
        )));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_model(path: &str) -> Result<()> {
    // Coefficients follow the fit-time column order of the model schema.
    let model = json!({
        "kind": "linear",
        "feature_names": [
            "PM10", "SO2", "NO2", "CO", "O3", "TEMP",
            "PRES", "DEWP", "RAIN", "wd", "WSPM", "station"
        ],
        "coefficients": [0.6, 0.05, 0.1, 0.02, -0.05, 0.3, -0.01, 0.1, -1.5, 0.0, -2.0, -1.0],
        "intercept": 8.0
    });
    std::fs::write(path, serde_json::to_string_pretty(&model)?)
        .with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let rows = simulate(&mut rng);

    write_csv("air_quality.csv", &rows, false)?;
    write_csv("air_quality_numerical.csv", &rows, true)?;
    write_parquet("air_quality_numerical.parquet", &rows)?;
    write_model("model.json")?;

    println!(
        "Wrote {} observations from {} stations and a linear model",
        rows.len(),
        STATIONS.len()
    );
    Ok(())
}
