use ndarray::{Array1, Array2};
use rust_linear::{
    Activation, Loss, OneVsRest, OptimizationMode, confusion_matrix, weighted_f1,
};
use tracing_subscriber::EnvFilter;

const N_CLASSES: usize = 4;

fn main() -> rust_linear::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Four unevenly sized clusters around the corners of a square.
    let centers = [(-2.0_f32, -2.0_f32), (2.0, -2.0), (-2.0, 2.0), (2.0, 2.0)];
    let sizes = [40, 25, 15, 30];

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for (class, (&(cx, cy), &size)) in centers.iter().zip(&sizes).enumerate() {
        for i in 0..size {
            let angle = i as f32 * 2.399;
            let radius = 0.3 + 0.7 * (i as f32 / size as f32);
            rows.push([cx + radius * angle.cos(), cy + radius * angle.sin()]);
            labels.push(class as f32);
        }
    }
    let x = Array2::from(rows);
    let y = Array1::from(labels);

    let mut ovr = OneVsRest::new(N_CLASSES, None)?;
    ovr.set_activation(Activation::Sigmoid)
        .set_objective(Loss::CrossEntropy)
        .set_mode(OptimizationMode::MiniBatch)
        .set_learning_rate(0.3)
        .set_iterations(2_000)
        .set_seed(Some(7));

    let reports = ovr.fit(x.view(), y.view())?;
    for (pair, report) in ovr.class_pairs().iter().zip(&reports) {
        println!(
            "pair {pair:?}: outcome={:?} final_loss={:.4}",
            report.outcome, report.final_loss
        );
    }
    if let Some(weights) = ovr.class_weights() {
        println!("class weights = {weights:?}");
    }

    let yhat = ovr.predict(x.view())?;
    println!("{}", confusion_matrix(y.view(), yhat.view(), N_CLASSES)?);
    println!("weighted f1 = {:.3}", weighted_f1(y.view(), yhat.view(), N_CLASSES)?);

    Ok(())
}
