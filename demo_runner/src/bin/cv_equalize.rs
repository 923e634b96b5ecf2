use cv_demos::demos::equalize;

fn main() -> anyhow::Result<()> {
    demo_runner::launch("cv_equalize", equalize::run)
}
