use ndarray::{Array1, Array2};
use rust_linear::{
    Activation, LinearModel, Loss, Regularization, RegularizationParams, mse,
};
use tracing_subscriber::EnvFilter;

fn main() -> rust_linear::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Only the first of five features matters.
    let rows = 60;
    let x = Array2::from_shape_fn((rows, 5), |(r, c)| {
        ((r * (c + 3)) % 11) as f32 / 11.0 - 0.5
    });
    let y: Array1<f32> = x.column(0).mapv(|v| 3.0 * v);

    let penalties = [
        ("none", None),
        ("l1", Some(Regularization::L1)),
        ("l2", Some(Regularization::L2)),
        ("ln", Some(Regularization::Ln)),
    ];

    for (name, penalty) in penalties {
        let mut model = LinearModel::new();
        model
            .set_activation(Activation::Identity)
            .set_objective(Loss::Huber)
            .set_huber_delta(0.5)
            .set_learning_rate(0.1)
            .set_iterations(2_000)
            .set_regularization_params(RegularizationParams {
                lambda: 1e-3,
                power: 3.0,
            })
            .set_seed(Some(1));
        if let Some(reg) = penalty {
            model.set_penalty(reg);
        }

        let report = model.fit(x.view(), y.view())?;
        let yhat = model.predict(x.view())?;
        println!(
            "{name:>4}: final_loss={:.4} mse={:.5}",
            report.final_loss,
            mse(y.view(), yhat.view())?
        );
        if let Some(w) = model.weights() {
            println!("      weights = {w:.3}");
        }
    }

    Ok(())
}
