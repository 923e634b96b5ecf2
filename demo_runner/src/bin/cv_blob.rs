use cv_demos::demos::blob;
use demo_runner::backend::OpenCvBlobDetector;

fn main() -> anyhow::Result<()> {
    demo_runner::launch("cv_blob", |args, config, presenter, out| {
        let mut detector = OpenCvBlobDetector::new(&config.blob)?;
        blob::run(args, config, presenter, out, &mut detector)
    })
}
