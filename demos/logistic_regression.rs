use ndarray::{Array1, Array2};
use rust_linear::{Activation, LinearModel, Loss, OptimizationMode, confusion_matrix};
use tracing_subscriber::EnvFilter;

fn main() -> rust_linear::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Two interleaved bands split by the line x1 + x2 = 0.
    let rows = 120;
    let x = Array2::from_shape_fn((rows, 2), |(r, c)| {
        let angle = r as f32 * 0.37 + c as f32 * 1.3;
        2.0 * angle.sin()
    });
    let y: Array1<f32> = x
        .outer_iter()
        .map(|row| if row[0] + row[1] > 0.0 { 1.0 } else { 0.0 })
        .collect();

    let mut model = LinearModel::new();
    model
        .set_activation(Activation::Sigmoid)
        .set_objective(Loss::CrossEntropy)
        .set_mode(OptimizationMode::MiniBatch)
        .set_batch_size(16)
        .set_learning_rate(0.5)
        .set_iterations(3_000)
        .set_seed(Some(42));

    let report = model.fit(x.view(), y.view())?;
    println!(
        "outcome={:?} final_loss={:.4} checkpoints={}",
        report.outcome,
        report.final_loss,
        report.checkpoints.len()
    );

    // Threshold probabilities with a hard sigmoid for class labels.
    model.set_activation(Activation::HardSigmoid { threshold: 0.5 });
    let labels = model.predict(x.view())?;
    let cm = confusion_matrix(y.view(), labels.view(), 2)?;
    println!("{cm}");
    println!("accuracy={:.3}", cm.accuracy());

    Ok(())
}
