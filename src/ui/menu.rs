//! Operator text menu.

use crate::api::sampler::Sampler;
use crate::config::Settings;
use crate::error::{LevelWatchError, Result};
use crate::monitor::levels::{self, SharedLevels};
use crate::monitor::scheduler::PollScheduler;
use crate::store;
use crate::ui::alerts::AlertSink;
use crate::ui::format::format_price;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use log::{debug, warn};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::time;

pub const STOP_HINT: &str = "Press Enter to stop the monitoring";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Exit,
    AddLevel,
    RemoveLevel,
    RemoveAllLevels,
    DisplayPrice,
    StartMonitoring,
}

pub fn parse_selection(input: &str) -> Result<MenuOption> {
    let option = match input.trim() {
        "0" => MenuOption::Exit,
        "1" => MenuOption::AddLevel,
        "2" => MenuOption::RemoveLevel,
        "3" => MenuOption::RemoveAllLevels,
        "4" => MenuOption::DisplayPrice,
        "5" => MenuOption::StartMonitoring,
        other => {
            return Err(LevelWatchError::InvalidInput(format!(
                "'{}' is not an option between 0 and 5",
                other
            )))
        }
    };
    Ok(option)
}

/// Parses a price level typed by the operator.
pub fn parse_level(input: &str) -> Result<f64> {
    let input = input.trim();
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LevelWatchError::InvalidInput(format!(
            "'{}' is not a valid number",
            input
        ))),
    }
}

pub struct Menu<R, W> {
    input: Lines<R>,
    out: W,
    levels: SharedLevels,
    sampler: Arc<dyn Sampler>,
    sink: Arc<dyn AlertSink>,
    settings: Settings,
    last_price: Option<f64>,
}

impl<R, W> Menu<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        input: R,
        out: W,
        levels: SharedLevels,
        sampler: Arc<dyn Sampler>,
        sink: Arc<dyn AlertSink>,
        settings: Settings,
    ) -> Self {
        Self {
            input: input.lines(),
            out,
            levels,
            sampler,
            sink,
            settings,
            last_price: None,
        }
    }

    /// Runs until the operator exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.show_options()?;
            match self.read_selection().await? {
                MenuOption::Exit => break,
                MenuOption::AddLevel => self.add_level().await?,
                MenuOption::RemoveLevel => self.remove_level().await?,
                MenuOption::RemoveAllLevels => {
                    levels::lock(&self.levels).clear();
                    self.levels_changed()?;
                }
                MenuOption::DisplayPrice => self.display_price().await?,
                MenuOption::StartMonitoring => self.monitor().await?,
            }
        }
        self.save_levels();
        Ok(())
    }

    fn show_options(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "MENU OPTIONS")?;
        writeln!(self.out, "============")?;
        writeln!(self.out, "1. Add a price level")?;
        writeln!(self.out, "2. Remove a price level")?;
        writeln!(self.out, "3. Remove all price levels")?;
        match self.last_price {
            Some(price) => writeln!(
                self.out,
                "4. Display the current {} price here: {}",
                self.settings.symbol,
                format_price(price)
            )?,
            None => writeln!(
                self.out,
                "4. Display the current {} price here",
                self.settings.symbol
            )?,
        }
        writeln!(self.out, "5. Start the monitoring")?;
        writeln!(self.out, "0. Exit the program")?;
        writeln!(self.out)?;
        Ok(())
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(self.input.next_line().await?)
    }

    async fn read_selection(&mut self) -> Result<MenuOption> {
        loop {
            let Some(line) = self.prompt("Please enter one of the options: ").await? else {
                return Ok(MenuOption::Exit);
            };
            match parse_selection(&line) {
                Ok(option) => return Ok(option),
                Err(_) => writeln!(self.out, "Please enter a valid option between 0 and 5")?,
            }
        }
    }

    async fn add_level(&mut self) -> Result<()> {
        let Some(line) = self.prompt("Enter a number: ").await? else {
            return Ok(());
        };
        let added = parse_level(&line).and_then(|value| levels::lock(&self.levels).add(value));
        match added {
            Ok(()) => self.levels_changed(),
            Err(LevelWatchError::DuplicateLevel(value)) => {
                writeln!(self.out, "{} is already in the list", value)?;
                Ok(())
            }
            Err(_) => {
                writeln!(self.out, "Number is not valid")?;
                Ok(())
            }
        }
    }

    async fn remove_level(&mut self) -> Result<()> {
        let Some(line) = self
            .prompt("Enter the number you want to remove from the list: ")
            .await?
        else {
            return Ok(());
        };
        let removed = parse_level(&line).and_then(|value| levels::lock(&self.levels).remove(value));
        match removed {
            Ok(()) => self.levels_changed(),
            Err(_) => {
                writeln!(self.out, "Number not in list")?;
                Ok(())
            }
        }
    }

    fn levels_changed(&mut self) -> Result<()> {
        self.save_levels();
        self.display_levels()
    }

    fn save_levels(&mut self) {
        let snapshot = levels::lock(&self.levels).clone();
        if let Err(e) = store::save(&self.settings.levels_file, &snapshot) {
            warn!(
                "Could not save levels to {}: {}",
                self.settings.levels_file.display(),
                e
            );
        }
    }

    fn display_levels(&mut self) -> Result<()> {
        let snapshot = levels::lock(&self.levels).snapshot();
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        writeln!(self.out, "Price Levels In The List")?;
        writeln!(self.out, "========================")?;
        for level in snapshot {
            writeln!(self.out, "{}", level)?;
        }
        Ok(())
    }

    async fn display_price(&mut self) -> Result<()> {
        let timeout = self.settings.sample_timeout;
        let reading = match time::timeout(timeout, self.sampler.read()).await {
            Ok(reading) => reading,
            Err(_) => Err(LevelWatchError::SamplerUnavailable(format!(
                "no reading within {:?}",
                timeout
            ))),
        };
        match reading {
            Ok(reading) => {
                self.last_price = Some(reading.value);
                writeln!(
                    self.out,
                    "{} price: {}",
                    self.settings.symbol,
                    format_price(reading.value)
                )?;
            }
            Err(e) => {
                warn!("Price request failed: {}", e);
                writeln!(self.out, "Price is not available right now")?;
            }
        }
        Ok(())
    }

    async fn monitor(&mut self) -> Result<()> {
        let mut scheduler = PollScheduler::new(
            Arc::clone(&self.sampler),
            Arc::clone(&self.sink),
            Arc::clone(&self.levels),
            self.settings.scheduler(),
        );
        if levels::lock(&self.levels).is_empty() {
            writeln!(self.out, "No price levels in the list, no alarm will sound")?;
        }
        scheduler.start()?;
        writeln!(
            self.out,
            "Monitoring {} ({})",
            self.settings.symbol, STOP_HINT
        )?;
        self.out.flush()?;

        // any line, or the end of input, stops the monitoring
        let waited = self.input.next_line().await;
        let session = scheduler.stop().await;
        debug!("Monitoring scheduler is {:?}", scheduler.state());
        if let Some(current) = session.as_ref().and_then(|s| s.current()) {
            self.last_price = Some(current.value);
        }
        writeln!(self.out, "Monitoring stopped")?;
        waited?;
        Ok(())
    }
}
