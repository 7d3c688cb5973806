//! Steps the date-picker widget from today's view to a target day.

use chrono::{Datelike, NaiveDate};

use super::site;
use crate::domain::error::Result;
use crate::domain::model::TargetDate;
use crate::domain::scope::Scope;
use crate::infrastructure::browser::DynBrowserDriver;

/// One interaction with the date-picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarStep {
    /// Day view to year list, through the month list
    OpenYearList,
    /// Day view to month list
    OpenMonthList,
    /// Pick a year in the year list; the widget moves to that year's month list
    SelectYear(i32),
    /// Pick an abbreviated month in the month list; the widget moves to its day view
    SelectMonth(String),
    /// Pick the day cell with this accessible label
    SelectDay(String),
}

/// Interactions that move a widget showing `now` to `target`.
///
/// The widget opens on the day view of the current month. A different year goes through the
/// year list, a different month of the same year through the month list. The day cell is
/// clicked whenever the view moved or the day differs; a target equal to `now` needs no
/// interaction.
pub fn plan(now: NaiveDate, target: &TargetDate) -> Vec<CalendarStep> {
    let year_differs = target.year() != now.year();
    let month_differs = year_differs || target.month() != now.month();

    let mut steps = Vec::new();
    if year_differs {
        steps.push(CalendarStep::OpenYearList);
        steps.push(CalendarStep::SelectYear(target.year()));
    } else if month_differs {
        steps.push(CalendarStep::OpenMonthList);
    }
    if month_differs {
        steps.push(CalendarStep::SelectMonth(target.month_label()));
    }
    if month_differs || target.day() != now.day() {
        steps.push(CalendarStep::SelectDay(target.label()));
    }
    steps
}

pub struct CalendarNavigator {
    driver: DynBrowserDriver,
}

impl CalendarNavigator {
    pub fn new(driver: DynBrowserDriver) -> Self {
        Self { driver }
    }

    /// Select `target` in an open date-picker anchored at `now`.
    ///
    /// Dates past the booking window are rejected before the widget is touched.
    pub async fn navigate_and_select(
        &self,
        scope: &Scope,
        now: NaiveDate,
        target: &TargetDate,
    ) -> Result<()> {
        target.ensure_within_window(now)?;

        let steps = plan(now, target);
        tracing::debug!(target = %target, steps = steps.len(), "Navigating date-picker");

        for step in &steps {
            self.apply(scope, step).await?;
        }
        Ok(())
    }

    async fn apply(&self, scope: &Scope, step: &CalendarStep) -> Result<()> {
        tracing::trace!(?step, "Calendar step");
        match step {
            CalendarStep::OpenYearList => {
                self.driver
                    .click(scope, &site::calendar_month_list_switch())
                    .await?;
                self.driver
                    .click(scope, &site::calendar_year_list_switch())
                    .await
            }
            CalendarStep::OpenMonthList => {
                self.driver
                    .click(scope, &site::calendar_month_list_switch())
                    .await
            }
            CalendarStep::SelectYear(year) => {
                let cell = site::calendar_year(*year);
                self.driver.wait_visible(scope, &cell).await?;
                self.driver.click(scope, &cell).await
            }
            CalendarStep::SelectMonth(label) => {
                let cell = site::calendar_month(label);
                self.driver.wait_visible(scope, &cell).await?;
                self.driver.click(scope, &cell).await
            }
            CalendarStep::SelectDay(label) => {
                self.driver.click(scope, &site::calendar_day(label)).await
            }
        }
    }
}
