mod command;
mod high_score_table;
mod policy;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
