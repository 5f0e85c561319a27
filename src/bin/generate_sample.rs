use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated row, written with Kaggle column names.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "PassengerId")]
    id: i64,
    #[serde(rename = "Survived")]
    survived: i64,
    #[serde(rename = "Pclass")]
    class: i64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "SibSp")]
    sibsp: i64,
    #[serde(rename = "Parch")]
    parch: i64,
    #[serde(rename = "Fare")]
    fare: Option<f64>,
    #[serde(rename = "Embarked")]
    port: Option<String>,
}

const SURNAMES: &[&str] = &[
    "Andersson", "Brown", "Carter", "Davies", "Elias", "Fortune", "Goodwin", "Harris",
    "Johnson", "Kelly", "Lefebre", "Moran", "Nasser", "O'Brien", "Palsson", "Rice",
    "Sage", "Thomas", "Ware", "Williams",
];
const MALE_NAMES: &[&str] = &["John", "William", "Charles", "George", "James", "Thomas", "Owen"];
const FEMALE_NAMES: &[&str] = &["Mary", "Anna", "Elizabeth", "Margaret", "Helen", "Eva", "Laina"];

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let class: i64 = match rng.next_f64() {
                p if p < 0.24 => 1,
                p if p < 0.45 => 2,
                _ => 3,
            };
            let female = rng.chance(0.35);
            let age = (!rng.chance(0.2)).then(|| {
                let a = rng.gauss(30.0 - 3.0 * class as f64, 14.0).clamp(0.42, 80.0);
                if a < 1.0 { (a * 100.0).round() / 100.0 } else { a.round() }
            });
            let sibsp = if rng.chance(0.68) { 0 } else { 1 + (rng.next_u64() % 4) as i64 };
            let parch = if rng.chance(0.76) { 0 } else { 1 + (rng.next_u64() % 3) as i64 };

            let base_fare = match class {
                1 => rng.gauss(84.0, 60.0).max(25.0),
                2 => rng.gauss(21.0, 9.0).max(10.5),
                _ => rng.gauss(13.0, 8.0).max(4.0),
            };
            let fare = (!rng.chance(0.002)).then(|| (base_fare * 100.0).round() / 100.0);
            let port = match rng.next_f64() {
                p if p < 0.002 => None,
                p if p < 0.19 => Some("C"),
                p if p < 0.28 => Some("Q"),
                _ => Some("S"),
            };

            let mut p_survive: f64 = match (female, class) {
                (true, 1) => 0.97,
                (true, 2) => 0.92,
                (true, _) => 0.50,
                (false, 1) => 0.37,
                (false, 2) => 0.16,
                (false, _) => 0.14,
            };
            if age.is_some_and(|a| a < 10.0) {
                p_survive += 0.3;
            }
            if sibsp + parch > 3 {
                p_survive *= 0.3;
            }

            let surname = rng.pick(SURNAMES);
            let (title, first) = if female {
                (if rng.chance(0.5) { "Mrs" } else { "Miss" }, rng.pick(FEMALE_NAMES))
            } else {
                ("Mr", rng.pick(MALE_NAMES))
            };

            Row {
                id: i as i64 + 1,
                survived: rng.chance(p_survive.min(1.0)) as i64,
                class,
                name: format!("{surname}, {title}. {first}"),
                sex: if female { "female" } else { "male" }.to_string(),
                age,
                sibsp,
                parch,
                fare,
                port: port.map(str::to_string),
            }
        })
        .collect()
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("PassengerId", DataType::Int64, false),
        Field::new("Survived", DataType::Int64, false),
        Field::new("Pclass", DataType::Int64, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Sex", DataType::Utf8, false),
        Field::new("Age", DataType::Float64, true),
        Field::new("SibSp", DataType::Int64, false),
        Field::new("Parch", DataType::Int64, false),
        Field::new("Fare", DataType::Float64, true),
        Field::new("Embarked", DataType::Utf8, true),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.survived))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.class))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.name.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sex.as_str()))),
            Arc::new(rows.iter().map(|r| r.age).collect::<Float64Array>()),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.sibsp))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.parch))),
            Arc::new(rows.iter().map(|r| r.fare).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.port.as_deref()).collect::<StringArray>()),
        ],
    )
    .context("building record batch")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, 891);

    let csv_path = "titanic_sample.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV file")?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;

    let batch = to_batch(&rows)?;
    let parquet_path = "titanic_sample.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} passengers to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
