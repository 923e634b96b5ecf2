use cv_demos::demos::optic_flow;
use demo_runner::backend::{DisFlow, open_capture};

/// Any container FFmpeg understands can be opened; flow comes from DIS.
fn main() -> anyhow::Result<()> {
    demo_runner::launch("cv_optic_flow", |args, config, presenter, out| {
        let mut estimator = DisFlow::new(config.flow.preset)?;
        optic_flow::run(args, config, presenter, out, &open_capture, &mut estimator)
    })
}
