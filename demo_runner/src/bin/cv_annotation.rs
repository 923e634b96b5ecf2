use cv_demos::demos::annotation;

fn main() -> anyhow::Result<()> {
    demo_runner::launch("cv_annotation", annotation::run)
}
