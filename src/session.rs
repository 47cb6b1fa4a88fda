//! Interactive exploration loop.
//!
//! A [`Session`] moves through [`State`]s: it prompts for a city and
//! filters, loads the city, reports statistics and pages of raw trips, then
//! asks whether to start over. Input and output are plain readers and
//! writers so that the whole loop can be driven from a script.

use anyhow::Result;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::city::City;
use crate::filter::{self, DayFilter, FilterSpec, FilteredView, MonthFilter};
use crate::output::{self, RULE};
use crate::paginate::Pager;
use crate::record::{RecordStore, TripTable};
use crate::stats::Report;

/// Where the loop currently is.
#[derive(Debug)]
pub enum State {
    Prompting,
    Loading(City, FilterSpec),
    Reporting(City, FilterSpec, TripTable),
    AwaitingRestart,
    Done,
}

pub struct Session<R, W> {
    store: RecordStore,
    page_size: usize,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(store: RecordStore, page_size: usize, input: R, out: W) -> Self {
        Self {
            store,
            page_size,
            input,
            out,
        }
    }

    /// Runs until the user declines to restart or input ends. Returns the
    /// number of completed reports.
    pub fn run(&mut self) -> Result<usize> {
        let mut state = State::Prompting;
        let mut reports = 0;

        loop {
            state = match state {
                State::Prompting => match self.prompt_filters()? {
                    Some((city, spec)) => State::Loading(city, spec),
                    None => State::Done,
                },
                State::Loading(city, spec) => match self.store.load_city(city) {
                    Ok(table) => State::Reporting(city, spec, table),
                    Err(e) => {
                        error!(%city, error = %e, "Failed to load city data");
                        writeln!(self.out, "Could not load data for {city}: {e}")?;
                        State::AwaitingRestart
                    }
                },
                State::Reporting(city, spec, table) => {
                    self.report(city, &spec, &table)?;
                    reports += 1;
                    State::AwaitingRestart
                }
                State::AwaitingRestart => {
                    if self.confirm("\nWould you like to restart? Enter yes or no.\n")? {
                        State::Prompting
                    } else {
                        State::Done
                    }
                }
                State::Done => break,
            };
        }

        info!(reports, "Session finished");
        Ok(reports)
    }

    fn prompt_filters(&mut self) -> Result<Option<(City, FilterSpec)>> {
        writeln!(self.out, "Hi there! Let's explore some US bikeshare data!")?;

        let Some(city) = self.select::<City>(
            "Please choose one of the 3 cities (chicago, new york city, washington): ",
        )?
        else {
            return Ok(None);
        };
        let Some(month) =
            self.select::<MonthFilter>("Please choose a month (all, january, february, ... , june): ")?
        else {
            return Ok(None);
        };
        let Some(day) =
            self.select::<DayFilter>("Please choose a day (all, monday, tuesday, ... sunday): ")?
        else {
            return Ok(None);
        };

        writeln!(self.out, "{RULE}")?;
        Ok(Some((city, FilterSpec::new(month, day))))
    }

    fn report(&mut self, city: City, spec: &FilterSpec, table: &TripTable) -> Result<()> {
        let view = filter::apply(table, spec);
        let report = Report::compute(&view);

        output::write_report(&mut self.out, city, spec, &report)?;
        if table.skipped_rows() > 0 {
            warn!(skipped = table.skipped_rows(), "Rows were skipped while loading");
            writeln!(
                self.out,
                "Note: {} rows with an unreadable start time were skipped.",
                table.skipped_rows()
            )?;
        }

        self.show_rows(&view)
    }

    fn show_rows(&mut self, view: &FilteredView<'_>) -> Result<()> {
        let question = format!(
            "\nWould you like to view {} rows of individual trip data? Enter yes or no: ",
            self.page_size
        );
        if !self.confirm(&question)? {
            return Ok(());
        }

        let schema = view.table().schema();
        let mut pager = Pager::new(view, self.page_size);
        loop {
            let offset = pager.offset();
            let Some(page) = pager.next() else {
                writeln!(self.out, "No trips to display.")?;
                return Ok(());
            };
            output::write_page(&mut self.out, schema, offset, &page)?;

            if pager.is_exhausted() {
                writeln!(self.out, "No more trips to display.")?;
                return Ok(());
            }
            if !self.confirm("Do you wish to continue? Enter yes or no: ")? {
                return Ok(());
            }
        }
    }

    /// Reads one trimmed line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompts until the answer parses as `T`.
    fn select<T>(&mut self, prompt: &str) -> Result<Option<T>>
    where
        T: FromStr + Display,
    {
        loop {
            write!(self.out, "{prompt}")?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match answer.parse::<T>() {
                Ok(value) => {
                    writeln!(self.out, "Great! the chosen entry is: {value}\n")?;
                    return Ok(Some(value));
                }
                Err(_) => {
                    writeln!(self.out, "Sorry... it seems like you're not typing a correct entry.")?;
                    writeln!(self.out, "Let's try again!")?;
                }
            }
        }
    }

    /// Only `yes` counts as yes; end of input counts as no.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.out, "{question}")?;
        Ok(self
            .read_line()?
            .is_some_and(|a| a.eq_ignore_ascii_case("yes")))
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
