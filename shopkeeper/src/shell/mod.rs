//! Interactive terminal shell.
//!
//! The shell owns no business rules. It reads lines, sends actions through
//! the [`Store`](shopkeeper_core::Store), and renders whatever the engine
//! state says afterwards. Reader and writer are generic so whole sessions
//! can be scripted in tests.

pub mod input;
mod menus;
pub mod render;

use std::io::{self, BufRead, Write};

use shopkeeper_core::Store;

use crate::aggregates::cart::CartAction;
use crate::aggregates::roster::RosterAction;
use crate::config::Config;
use crate::engine::{EngineAction, EngineReducer};
use crate::persistence::files;
use crate::types::ActorId;

/// Runs the shell until the operator saves and exits (or input runs out).
///
/// # Errors
///
/// Returns an error when the terminal reader or writer fails. Persistence
/// problems are reported on screen and never abort the session.
pub fn run<R: BufRead, W: Write>(
    store: &mut Store<EngineReducer>,
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()> {
    let mut shell = Shell { store, config, input, output };
    shell.entry_loop()?;
    Ok(())
}

pub(crate) struct Shell<'a, R, W> {
    pub(crate) store: &'a mut Store<EngineReducer>,
    pub(crate) config: &'a Config,
    pub(crate) input: &'a mut R,
    pub(crate) output: &'a mut W,
}

impl<R: BufRead, W: Write> Shell<'_, R, W> {
    fn entry_loop(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n=== Shopkeeper ===")?;
            writeln!(self.output, "1. Log in")?;
            writeln!(self.output, "2. Register")?;
            writeln!(self.output, "3. Request an administrator account")?;
            writeln!(self.output, "4. Forgot password")?;
            writeln!(self.output, "0. Save and exit")?;
            let Some(choice) = input::read_choice(self.input, self.output, "Select: ", 4)? else {
                // Input ended; save what we can and leave.
                self.save_catalog_and_roster()?;
                return Ok(());
            };
            match choice {
                1 => self.login()?,
                2 => self.register(false)?,
                3 => self.register(true)?,
                4 => self.forgot_password()?,
                _ => {
                    if self.save_catalog_and_roster()? {
                        writeln!(self.output, "Saved. Goodbye.")?;
                        return Ok(());
                    }
                    writeln!(self.output, "The data is still in memory, try again.")?;
                },
            }
        }
    }

    fn login(&mut self) -> io::Result<()> {
        let Some(username) = input::read_nonempty(self.input, self.output, "Username: ")? else {
            return Ok(());
        };
        let Some(password) = input::read_nonempty(self.input, self.output, "Password: ")? else {
            return Ok(());
        };
        let Some(record) = self.store.state().roster.authenticate(&username, &password).cloned()
        else {
            writeln!(self.output, "Invalid credentials.")?;
            return Ok(());
        };
        writeln!(self.output, "Welcome, {}.", record.username)?;
        if record.is_admin {
            self.admin_menu()
        } else {
            self.restore_cart(record.id)?;
            self.customer_menu(record.id)?;
            self.persist_cart(record.id)
        }
    }

    fn register(&mut self, request_admin: bool) -> io::Result<()> {
        let Some(username) = input::read_nonempty(self.input, self.output, "Username: ")? else {
            return Ok(());
        };
        let Some(password) =
            input::read_nonempty(self.input, self.output, "Password (4+ characters): ")?
        else {
            return Ok(());
        };
        self.store.send(EngineAction::Roster(RosterAction::RegisterActor {
            username,
            password,
            request_admin,
        }));
        let error = self.store.state().roster.last_error.clone();
        let success = if request_admin {
            "Request queued for an administrator to review."
        } else {
            "Registered. You can log in now."
        };
        self.report_outcome(error, success)
    }

    /// Replaces a password from the entry gate. The roster rejects unknown
    /// usernames and too-short replacements.
    fn forgot_password(&mut self) -> io::Result<()> {
        let Some(username) = input::read_nonempty(self.input, self.output, "Username: ")? else {
            return Ok(());
        };
        let Some(new_password) =
            input::read_nonempty(self.input, self.output, "New password (4+ characters): ")?
        else {
            return Ok(());
        };
        self.store.send(EngineAction::Roster(RosterAction::ResetPassword {
            username,
            new_password,
        }));
        let error = self.store.state().roster.last_error.clone();
        self.report_outcome(error, "Password reset. Log in with the new one.")
    }

    /// Loads the actor's saved cart file into the engine, replacing whatever
    /// an earlier session of this process left in memory.
    fn restore_cart(&mut self, actor_id: ActorId) -> io::Result<()> {
        let path = self.config.data.cart_path(actor_id);
        let cart = match files::load_cart(&path) {
            Ok(cart) => cart,
            Err(error) => {
                writeln!(self.output, "Could not read the saved cart: {error}")?;
                return Ok(());
            },
        };
        if !cart.is_empty() {
            writeln!(self.output, "Restored {} line(s) from your saved cart.", cart.len())?;
        }
        self.store.send(EngineAction::Cart(CartAction::RestoreCart { actor_id, cart }));
        Ok(())
    }

    /// Writes the actor's current cart to its file. Failures are reported
    /// and the in-memory cart stays authoritative.
    pub(crate) fn persist_cart(&mut self, actor_id: ActorId) -> io::Result<()> {
        let path = self.config.data.cart_path(actor_id);
        let cart = self.store.state().carts.cart(actor_id).cloned().unwrap_or_default();
        if let Err(error) = files::save_cart(&path, &cart) {
            writeln!(self.output, "Could not save the cart: {error}")?;
        }
        Ok(())
    }

    /// Saves the catalog and roster files, reporting every failure.
    /// Returns whether both writes went through.
    pub(crate) fn save_catalog_and_roster(&mut self) -> io::Result<bool> {
        let state = self.store.state();
        let inventory = files::save_inventory(&self.config.data.inventory_path(), &state.inventory);
        let roster = files::save_roster(&self.config.data.roster_path(), &state.roster);
        let mut clean = true;
        for error in [inventory.err(), roster.err()].into_iter().flatten() {
            clean = false;
            writeln!(self.output, "Save failed: {error}")?;
        }
        Ok(clean)
    }

    pub(crate) fn report_outcome(
        &mut self,
        error: Option<String>,
        success: &str,
    ) -> io::Result<()> {
        match error {
            Some(error) => writeln!(self.output, "Error: {error}"),
            None => writeln!(self.output, "{success}"),
        }
    }
}
