use cv_demos::demos::normalize;

fn main() -> anyhow::Result<()> {
    demo_runner::launch("cv_normalize", normalize::run)
}
