use clap::Parser;
use city_pulse::{
    init_errors,
    init_logging,
    App,
};
use city_pulse_config::Args;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    let debug = args.debug;
    let app = App::new(args)?;
    init_logging(app.config().data_dir(), debug)?;
    app.run().await
}
