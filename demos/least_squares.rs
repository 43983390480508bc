use ndarray::{Array1, Array2};
use rust_linear::{Activation, LinearModel, Loss, OptimizationMode, mae, mse};
use tracing_subscriber::EnvFilter;

fn main() -> rust_linear::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // y = 2 + 0.5 x1 - 1.5 x2 with a little deterministic wobble.
    let rows = 200;
    let x = Array2::from_shape_fn((rows, 2), |(r, c)| {
        let t = r as f32 / rows as f32;
        if c == 0 { 4.0 * t - 2.0 } else { (7.0 * t).sin() }
    });
    let y: Array1<f32> = x
        .outer_iter()
        .enumerate()
        .map(|(r, row)| 2.0 + 0.5 * row[0] - 1.5 * row[1] + 0.01 * ((r % 5) as f32 - 2.0))
        .collect();

    let mut model = LinearModel::new();
    model
        .set_activation(Activation::Identity)
        .set_objective(Loss::Squared)
        .set_learning_rate(0.05)
        .set_iterations(5_000)
        .set_seed(Some(0));

    for mode in [
        OptimizationMode::Full,
        OptimizationMode::MiniBatch,
        OptimizationMode::SingleSample,
    ] {
        model.set_mode(mode);
        let report = model.fit(x.view(), y.view())?;
        let yhat = model.predict(x.view())?;

        println!(
            "{mode:?}: outcome={:?} iterations={} rows/iter={} mse={:.5} mae={:.5}",
            report.outcome,
            report.iterations,
            report.rows_per_iteration,
            mse(y.view(), yhat.view())?,
            mae(y.view(), yhat.view())?,
        );
        if let Some(w) = model.weights() {
            println!("  weights (bias first) = {w}");
        }
    }

    Ok(())
}
