use crate::{
    input::{
        Input,
        HELP,
    },
    render::render,
};
use city_pulse_config::{
    Args,
    Config,
};
use city_pulse_engine::{
    DashboardState,
    SyncCommand,
    SyncController,
};
use color_eyre::Result;
use std::io::{
    IsTerminal as _,
    Write as _,
};
use tokio::io::{
    AsyncBufReadExt as _,
    BufReader,
};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

pub struct App {
    config: Config,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let save = args.save;
        let config = Config::new(args)?;
        config.validate()?;
        if save {
            config.save()?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Renders every published state until `q`, Ctrl-C or the sync task stops.
    pub async fn run(self) -> Result<()> {
        let controller = SyncController::spawn_with_config(&self.config)?;
        let mut state = controller.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        draw(&state.borrow_and_update().clone())?;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }

                changed = state.changed() => {
                    if changed.is_err() {
                        warn!("Metric sync stopped");
                        break;
                    }
                    let current = state.borrow_and_update().clone();
                    draw(&current)?;
                }

                line = lines.next_line(), if stdin_open => {
                    let Some(line) = line? else {
                        debug!("stdin closed, commands disabled");
                        stdin_open = false;
                        continue;
                    };
                    match Input::parse(&line) {
                        Some(Input::Quit) => break,
                        Some(Input::Retry) => controller.send(SyncCommand::Retry),
                        Some(Input::ViewMode(view_mode)) => controller.send(SyncCommand::SetViewMode(view_mode)),
                        Some(Input::ToggleViewMode) => controller.send(SyncCommand::ToggleViewMode),
                        Some(Input::Redraw) => draw(&controller.current())?,
                        Some(Input::Help) => println!("{HELP}"),
                        None => println!("unknown command {:?}, {HELP}", line.trim()),
                    }
                }
            }
        }

        controller.shutdown().await;
        Ok(())
    }
}

fn draw(state: &DashboardState) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if stdout.is_terminal() {
        write!(stdout, "{CLEAR_SCREEN}")?;
    }
    write!(stdout, "{}", render(state))?;
    writeln!(stdout, "{HELP}")?;
    stdout.flush()?;
    Ok(())
}
