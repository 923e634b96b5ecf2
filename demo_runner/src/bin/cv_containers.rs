use cv_demos::demos::containers;

fn main() -> anyhow::Result<()> {
    demo_runner::launch("cv_containers", containers::run)
}
