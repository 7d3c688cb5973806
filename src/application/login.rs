//! Member login through the identity provider form.

use std::time::Duration;

use super::race::{Probe, RaceDetector};
use super::site;
use crate::domain::error::Result;
use crate::domain::model::Credentials;
use crate::domain::scope::Scope;
use crate::infrastructure::browser::DynBrowserDriver;

/// State of the username field once the credential form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginBranch {
    /// The field is editable and still has to be filled
    FillNeeded,
    /// The provider remembered the member and locked the field
    AlreadyFilled,
}

pub struct LoginFlow {
    driver: DynBrowserDriver,
    race: RaceDetector,
    form_settle: Duration,
    step_timeout: Duration,
}

impl LoginFlow {
    /// `branch_timeout` bounds the username race, `step_timeout` each form interaction.
    pub fn new(
        driver: DynBrowserDriver,
        branch_timeout: Duration,
        form_settle: Duration,
        step_timeout: Duration,
    ) -> Self {
        Self {
            driver,
            race: RaceDetector::new(branch_timeout),
            form_settle,
            step_timeout,
        }
    }

    /// Log in from the bookings landing page. Failures are reported with the step
    /// that failed; nothing is retried here.
    pub async fn login(&self, scope: &Scope, credentials: &Credentials) -> Result<()> {
        tracing::info!(email = %credentials.email, "Logging in");

        self.driver
            .click(&scope.with_timeout(self.step_timeout), &site::login_entry())
            .await
            .map_err(|e| e.at_login_step("open login form"))?;

        if !self.form_settle.is_zero() {
            scope
                .sleep(self.form_settle)
                .await
                .map_err(|e| e.at_login_step("open login form"))?;
        }

        self.race
            .race_and_act(scope, self.branch_probes(), |branch| {
                self.enter_username(scope, branch, &credentials.email)
            })
            .await
            .map_err(|e| e.at_login_step("username"))?;

        self.enter_password(scope, &credentials.password)
            .await
            .map_err(|e| e.at_login_step("password"))?;

        tracing::info!("Login submitted");
        Ok(())
    }

    fn branch_probes(&self) -> Vec<Probe<LoginBranch>> {
        let editable = self.driver.clone();
        let prefilled = self.driver.clone();
        vec![
            Probe::new("username editable", LoginBranch::FillNeeded, move |scope| async move {
                editable
                    .wait_ready(&scope, &site::email_input_editable())
                    .await
            }),
            Probe::new(
                "username prefilled",
                LoginBranch::AlreadyFilled,
                move |scope| async move {
                    prefilled
                        .wait_ready(&scope, &site::email_input_prefilled())
                        .await
                },
            ),
        ]
    }

    async fn enter_username(&self, scope: &Scope, branch: LoginBranch, email: &str) -> Result<()> {
        match branch {
            LoginBranch::FillNeeded => {
                let step = scope.with_timeout(self.step_timeout);
                let field = site::email_input();
                self.driver.click(&step, &field).await?;
                self.driver.clear(&step, &field).await?;
                self.driver.send_keys(&step, &field, email).await?;
                self.driver.click(&step, &site::login_submit()).await?;
                tracing::debug!("Username entered");
            }
            LoginBranch::AlreadyFilled => {
                tracing::debug!("Username already filled, skipping");
            }
        }
        Ok(())
    }

    async fn enter_password(&self, scope: &Scope, password: &str) -> Result<()> {
        let step = scope.with_timeout(self.step_timeout);
        let field = site::password_input();
        self.driver.wait_visible(&step, &field).await?;
        self.driver.send_keys(&step, &field, password).await?;
        self.driver.click(&step, &site::login_submit()).await
    }
}
