use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use std::fs::File;
use std::sync::Arc;

#[derive(Debug)]
pub struct IterationRecord {
    pub iteration: usize,
    pub best_cost: f64,
    pub crossover_ok: usize,
    pub crossover_total: usize,
    pub mutation_attempts: usize,
    pub mutation_accepted: usize,
    pub time: f64,
}

pub fn serialize_to_parquet(
    iteration_data: &[IterationRecord],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let iterations: Int64Array = iteration_data.iter().map(|d| d.iteration as i64).collect();
    let best_costs: Float64Array = iteration_data.iter().map(|d| d.best_cost).collect();
    let crossover_ok: Int64Array = iteration_data
        .iter()
        .map(|d| d.crossover_ok as i64)
        .collect();
    let crossover_total: Int64Array = iteration_data
        .iter()
        .map(|d| d.crossover_total as i64)
        .collect();
    let mutation_attempts: Int64Array = iteration_data
        .iter()
        .map(|d| d.mutation_attempts as i64)
        .collect();
    let mutation_accepted: Int64Array = iteration_data
        .iter()
        .map(|d| d.mutation_accepted as i64)
        .collect();
    let times: Float64Array = iteration_data.iter().map(|d| d.time).collect();

    // Arrow schema
    let schema = Schema::new(vec![
        Field::new("iteration", DataType::Int64, false),
        Field::new("best_cost", DataType::Float64, false),
        Field::new("crossover_ok", DataType::Int64, false),
        Field::new("crossover_total", DataType::Int64, false),
        Field::new("mutation_attempts", DataType::Int64, false),
        Field::new("mutation_accepted", DataType::Int64, false),
        Field::new("time", DataType::Float64, false),
    ]);

    let batch = RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(iterations),
            Arc::new(best_costs),
            Arc::new(crossover_ok),
            Arc::new(crossover_total),
            Arc::new(mutation_attempts),
            Arc::new(mutation_accepted),
            Arc::new(times),
        ],
    )?;

    let file = File::create(filename)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(())
}
