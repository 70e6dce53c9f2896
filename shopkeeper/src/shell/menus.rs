//! Customer and administrator menu loops.

use std::io::{self, BufRead, Write};

use super::{Shell, input, render};
use crate::aggregates::cart::CartAction;
use crate::aggregates::checkout::{CheckoutAction, CheckoutPhase};
use crate::aggregates::inventory::InventoryAction;
use crate::aggregates::ledger::LedgerScope;
use crate::aggregates::roster::RosterAction;
use crate::engine::EngineAction;
use crate::types::{
    ActorId, Category, Placement, Product, ProductId, Resolution, Section, Shortage, Size,
    StockInit, TransactionId,
};

impl<R: BufRead, W: Write> Shell<'_, R, W> {
    // ========================================================================
    // Customer menu
    // ========================================================================

    pub(crate) fn customer_menu(&mut self, actor_id: ActorId) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--- Shop ---")?;
            writeln!(self.output, "1. Browse products")?;
            writeln!(self.output, "2. Browse a category")?;
            writeln!(self.output, "3. Add to cart")?;
            writeln!(self.output, "4. Change a cart line")?;
            writeln!(self.output, "5. Remove a cart line")?;
            writeln!(self.output, "6. View cart")?;
            writeln!(self.output, "7. Checkout")?;
            writeln!(self.output, "8. My transactions")?;
            writeln!(self.output, "9. Product details")?;
            writeln!(self.output, "10. My account")?;
            writeln!(self.output, "0. Log out")?;
            let Some(choice) = input::read_choice(self.input, self.output, "Select: ", 10)? else {
                return Ok(());
            };
            match choice {
                1 => self.show_all_products()?,
                2 => self.browse_category()?,
                3 => self.add_to_cart(actor_id)?,
                4 => self.update_cart_line(actor_id)?,
                5 => self.remove_cart_line(actor_id)?,
                6 => self.show_cart(actor_id)?,
                7 => self.checkout(actor_id)?,
                8 => self.ledger_menu(LedgerScope::Actor(actor_id))?,
                9 => self.show_product_details()?,
                10 => self.show_account(actor_id)?,
                _ => return Ok(()),
            }
        }
    }

    fn show_all_products(&mut self) -> io::Result<()> {
        let listing = render::product_listing(&self.store.state().inventory.list_all());
        writeln!(self.output, "{listing}")
    }

    /// Lists one category, either the whole of it or a single section.
    fn browse_category(&mut self) -> io::Result<()> {
        let Some(category) = self.pick_category()? else {
            return Ok(());
        };
        let mut placement = None;
        if let Some(options) = Self::sections_for(category) {
            writeln!(
                self.output,
                "0. Whole category  1. {}  2. {}  3. {}",
                options[0], options[1], options[2],
            )?;
            let Some(choice) = input::read_choice(self.input, self.output, "Section: ", 3)? else {
                return Ok(());
            };
            if choice > 0 {
                placement = Placement::resolve(category, options[choice - 1]).ok();
            }
        }
        let inventory = &self.store.state().inventory;
        let listing = match placement {
            Some(placement) => render::product_listing(&inventory.list_in(placement)),
            None => render::product_listing(&inventory.list_by_category(category)),
        };
        writeln!(self.output, "{listing}")
    }

    fn show_product_details(&mut self) -> io::Result<()> {
        let Some(id) = input::read_u32(self.input, self.output, "Product id: ")? else {
            return Ok(());
        };
        let product_id = ProductId::new(id);
        let row = self.store.state().inventory.product(product_id).map(render::product_row);
        match row {
            Some(row) => writeln!(self.output, "{row}"),
            None => writeln!(self.output, "No product with id {product_id}."),
        }
    }

    fn show_account(&mut self, actor_id: ActorId) -> io::Result<()> {
        let view = self.store.state().roster.actor(actor_id).map(render::account_view);
        match view {
            Some(view) => writeln!(self.output, "{view}"),
            None => writeln!(self.output, "No account on file."),
        }
    }

    fn add_to_cart(&mut self, actor_id: ActorId) -> io::Result<()> {
        self.show_all_products()?;
        let Some((product_id, sized)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(size) = self.pick_size(sized)? else {
            return Ok(());
        };
        let Some(quantity) = input::read_u32(self.input, self.output, "Quantity: ")? else {
            return Ok(());
        };
        self.send_cart(CartAction::AddItem { actor_id, product_id, size, quantity }, "Added.")?;
        self.persist_cart(actor_id)
    }

    fn update_cart_line(&mut self, actor_id: ActorId) -> io::Result<()> {
        let Some((product_id, sized)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(size) = self.pick_size(sized)? else {
            return Ok(());
        };
        let Some(quantity) =
            input::read_u32(self.input, self.output, "New quantity (0 clears the size): ")?
        else {
            return Ok(());
        };
        self.send_cart(
            CartAction::UpdateItem { actor_id, product_id, size, quantity },
            "Updated.",
        )?;
        self.persist_cart(actor_id)
    }

    fn remove_cart_line(&mut self, actor_id: ActorId) -> io::Result<()> {
        let Some(id) = input::read_u32(self.input, self.output, "Product id: ")? else {
            return Ok(());
        };
        let product_id = ProductId::new(id);
        self.send_cart(CartAction::RemoveItem { actor_id, product_id }, "Removed.")?;
        self.persist_cart(actor_id)
    }

    fn show_cart(&mut self, actor_id: ActorId) -> io::Result<()> {
        let state = self.store.state();
        let view = state
            .carts
            .cart(actor_id)
            .map_or_else(|| "(cart is empty)".to_string(), |cart| {
                render::cart_view(cart, &state.inventory)
            });
        writeln!(self.output, "{view}")
    }

    // ========================================================================
    // Checkout
    // ========================================================================

    fn checkout(&mut self, actor_id: ActorId) -> io::Result<()> {
        self.store.send(EngineAction::Checkout(CheckoutAction::BeginCheckout { actor_id }));
        if let Some(error) = self.store.state().checkout.last_error.clone() {
            writeln!(self.output, "Error: {error}")?;
            return Ok(());
        }
        loop {
            match self.store.state().checkout.phase.clone() {
                CheckoutPhase::AwaitingResolution { shortages, .. } => {
                    let report =
                        render::shortage_report(&shortages, &self.store.state().inventory);
                    writeln!(self.output, "{report}")?;
                    let Some(resolution) = self.pick_resolution(&shortages)? else {
                        // Input ended mid-checkout; abort so nothing stays parked.
                        self.store.send(EngineAction::Checkout(CheckoutAction::Resolve {
                            actor_id,
                            resolution: Resolution::Abort,
                        }));
                        continue;
                    };
                    self.store.send(EngineAction::Checkout(CheckoutAction::Resolve {
                        actor_id,
                        resolution,
                    }));
                    if let Some(error) = self.store.state().checkout.last_error.clone() {
                        writeln!(self.output, "Error: {error}")?;
                    }
                },
                CheckoutPhase::Done { transaction } => {
                    writeln!(self.output, "{}", render::receipt(&transaction))?;
                    self.persist_cart(actor_id)?;
                    // The sale changed stock and spend totals.
                    self.save_catalog_and_roster()?;
                    return Ok(());
                },
                CheckoutPhase::Cancelled { reason } => {
                    writeln!(self.output, "Checkout cancelled: {reason}.")?;
                    self.persist_cart(actor_id)?;
                    return Ok(());
                },
                CheckoutPhase::Idle | CheckoutPhase::Committing { .. } => {
                    let message = self
                        .store
                        .state()
                        .checkout
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "checkout did not complete".to_string());
                    writeln!(self.output, "Checkout failed: {message}")?;
                    self.persist_cart(actor_id)?;
                    return Ok(());
                },
            }
        }
    }

    fn pick_resolution(&mut self, shortages: &[Shortage]) -> io::Result<Option<Resolution>> {
        loop {
            writeln!(self.output, "1. Reduce a line to what is available")?;
            writeln!(self.output, "2. Remove a line from the cart")?;
            writeln!(self.output, "3. Cancel the checkout")?;
            let Some(choice) = input::read_choice(self.input, self.output, "Select: ", 3)? else {
                return Ok(None);
            };
            let keep_line = match choice {
                1 => true,
                2 => false,
                _ => return Ok(Some(Resolution::Abort)),
            };
            let Some(number) = input::read_choice(
                self.input,
                self.output,
                "Line number (0 to go back): ",
                shortages.len(),
            )?
            else {
                return Ok(None);
            };
            if number == 0 {
                continue;
            }
            let Some(&shortage) = shortages.get(number - 1) else {
                continue;
            };
            return Ok(Some(if keep_line {
                Resolution::ReduceToAvailable {
                    product_id: shortage.product_id,
                    size: shortage.size,
                }
            } else {
                Resolution::RemoveItem { product_id: shortage.product_id }
            }));
        }
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub(crate) fn ledger_menu(&mut self, scope: LedgerScope) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--- Transactions ---")?;
            writeln!(self.output, "1. List all")?;
            writeln!(self.output, "2. Find by id")?;
            writeln!(self.output, "3. Filter by date range")?;
            writeln!(self.output, "4. Filter by amount range")?;
            writeln!(self.output, "5. Summary")?;
            writeln!(self.output, "0. Back")?;
            let Some(choice) = input::read_choice(self.input, self.output, "Select: ", 5)? else {
                return Ok(());
            };
            match choice {
                1 => {
                    let rows: Vec<String> = self
                        .store
                        .state()
                        .ledger
                        .records(scope)
                        .into_iter()
                        .map(render::transaction_brief)
                        .collect();
                    self.print_rows(rows)?;
                },
                2 => self.find_transaction(scope)?,
                3 => self.filter_by_date(scope)?,
                4 => self.filter_by_amount(scope)?,
                5 => {
                    let summary = self.store.state().ledger.summary(scope);
                    writeln!(self.output, "{}", render::summary_view(&summary))?;
                },
                _ => return Ok(()),
            }
        }
    }

    fn find_transaction(&mut self, scope: LedgerScope) -> io::Result<()> {
        let Some(id) = input::read_u32(self.input, self.output, "Transaction id: ")? else {
            return Ok(());
        };
        let text =
            self.store.state().ledger.find(scope, TransactionId::new(id)).map(render::receipt);
        match text {
            Some(text) => writeln!(self.output, "{text}"),
            None => writeln!(self.output, "No transaction #{id}."),
        }
    }

    fn filter_by_date(&mut self, scope: LedgerScope) -> io::Result<()> {
        let Some(start) = input::read_date(self.input, self.output, "From (YYYY-MM-DD): ")? else {
            return Ok(());
        };
        let Some(end) = input::read_date(self.input, self.output, "To (YYYY-MM-DD): ")? else {
            return Ok(());
        };
        let rows: Vec<String> = self
            .store
            .state()
            .ledger
            .filter_by_date_range(scope, start, end)
            .into_iter()
            .map(render::transaction_brief)
            .collect();
        self.print_rows(rows)
    }

    fn filter_by_amount(&mut self, scope: LedgerScope) -> io::Result<()> {
        let Some(min) = input::read_money(self.input, self.output, "Minimum total: ")? else {
            return Ok(());
        };
        let Some(max) = input::read_money(self.input, self.output, "Maximum total: ")? else {
            return Ok(());
        };
        let rows: Vec<String> = self
            .store
            .state()
            .ledger
            .filter_by_amount_range(scope, min, max)
            .into_iter()
            .map(render::transaction_brief)
            .collect();
        self.print_rows(rows)
    }

    fn print_rows(&mut self, rows: Vec<String>) -> io::Result<()> {
        if rows.is_empty() {
            return writeln!(self.output, "(none)");
        }
        for row in rows {
            writeln!(self.output, "{row}")?;
        }
        Ok(())
    }

    // ========================================================================
    // Administrator menu
    // ========================================================================

    pub(crate) fn admin_menu(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n--- Administration ---")?;
            writeln!(self.output, "1. List products")?;
            writeln!(self.output, "2. Add product")?;
            writeln!(self.output, "3. Remove product")?;
            writeln!(self.output, "4. Set stock")?;
            writeln!(self.output, "5. Adjust stock")?;
            writeln!(self.output, "6. Set price")?;
            writeln!(self.output, "7. Rename product")?;
            writeln!(self.output, "8. Move product")?;
            writeln!(self.output, "9. All transactions")?;
            writeln!(self.output, "10. Pending admin requests")?;
            writeln!(self.output, "11. Reset a password")?;
            writeln!(self.output, "12. Save catalog and accounts")?;
            writeln!(self.output, "0. Log out")?;
            let Some(choice) = input::read_choice(self.input, self.output, "Select: ", 12)? else {
                return Ok(());
            };
            match choice {
                1 => self.show_all_products()?,
                2 => self.add_product()?,
                3 => self.remove_product()?,
                4 => self.set_stock()?,
                5 => self.adjust_stock()?,
                6 => self.set_price()?,
                7 => self.rename_product()?,
                8 => self.move_product()?,
                9 => self.ledger_menu(LedgerScope::Oversight)?,
                10 => self.review_admin_requests()?,
                11 => self.reset_password()?,
                12 => {
                    if self.save_catalog_and_roster()? {
                        writeln!(self.output, "Saved.")?;
                    }
                },
                _ => return Ok(()),
            }
        }
    }

    fn add_product(&mut self) -> io::Result<()> {
        let Some(name) = input::read_nonempty(self.input, self.output, "Name: ")? else {
            return Ok(());
        };
        let Some(category) = self.pick_category()? else {
            return Ok(());
        };
        let Some(section) = self.pick_section(category)? else {
            return Ok(());
        };
        let Some(price) = input::read_money(self.input, self.output, "Price: ")? else {
            return Ok(());
        };
        writeln!(self.output, "1. Sized (XS-XL)  2. One-size")?;
        let Some(mode) = input::read_choice(self.input, self.output, "Mode: ", 2)? else {
            return Ok(());
        };
        let stock = match mode {
            1 => {
                let mut counts = [0u32; 5];
                for (slot, size) in counts.iter_mut().zip(Size::SIZED) {
                    let Some(quantity) =
                        input::read_u32(self.input, self.output, &format!("{size}: "))?
                    else {
                        return Ok(());
                    };
                    *slot = quantity;
                }
                StockInit::Sized {
                    xs: counts[0],
                    s: counts[1],
                    m: counts[2],
                    l: counts[3],
                    xl: counts[4],
                }
            },
            2 => {
                let Some(quantity) = input::read_u32(self.input, self.output, "Quantity: ")? else {
                    return Ok(());
                };
                StockInit::Sizeless { quantity }
            },
            _ => return Ok(()),
        };
        self.send_inventory(
            InventoryAction::AddProduct { name, category, section, price, stock },
            "Product added.",
        )
    }

    fn remove_product(&mut self) -> io::Result<()> {
        let Some((id, _)) = self.pick_product()? else {
            return Ok(());
        };
        self.send_inventory(InventoryAction::RemoveProduct { id }, "Product removed.")
    }

    fn set_stock(&mut self) -> io::Result<()> {
        let Some((id, sized)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(size) = self.pick_size(sized)? else {
            return Ok(());
        };
        let Some(quantity) = input::read_u32(self.input, self.output, "Quantity: ")? else {
            return Ok(());
        };
        self.send_inventory(InventoryAction::SetStock { id, size, quantity }, "Stock updated.")
    }

    fn adjust_stock(&mut self) -> io::Result<()> {
        let Some((id, sized)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(size) = self.pick_size(sized)? else {
            return Ok(());
        };
        let Some(delta) =
            input::read_i64(self.input, self.output, "Change (negative to deduct): ")?
        else {
            return Ok(());
        };
        self.send_inventory(InventoryAction::AdjustStock { id, size, delta }, "Stock updated.")
    }

    fn set_price(&mut self) -> io::Result<()> {
        let Some((id, _)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(price) = input::read_money(self.input, self.output, "New price: ")? else {
            return Ok(());
        };
        self.send_inventory(InventoryAction::SetPrice { id, price }, "Price updated.")
    }

    fn rename_product(&mut self) -> io::Result<()> {
        let Some((id, _)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(name) = input::read_nonempty(self.input, self.output, "New name: ")? else {
            return Ok(());
        };
        self.send_inventory(InventoryAction::RenameProduct { id, name }, "Product renamed.")
    }

    fn move_product(&mut self) -> io::Result<()> {
        let Some((id, _)) = self.pick_product()? else {
            return Ok(());
        };
        let Some(category) = self.pick_category()? else {
            return Ok(());
        };
        let Some(section) = self.pick_section(category)? else {
            return Ok(());
        };
        self.send_inventory(
            InventoryAction::MoveProduct { id, category, section },
            "Product moved.",
        )
    }

    fn review_admin_requests(&mut self) -> io::Result<()> {
        let pending: Vec<String> = self
            .store
            .state()
            .roster
            .pending_requests()
            .iter()
            .map(|request| request.username.clone())
            .collect();
        if pending.is_empty() {
            return writeln!(self.output, "(no pending requests)");
        }
        for (position, username) in pending.iter().enumerate() {
            writeln!(self.output, "  {}. {username}", position + 1)?;
        }
        writeln!(self.output, "1. Approve  2. Reject  0. Back")?;
        let Some(choice) = input::read_choice(self.input, self.output, "Select: ", 2)? else {
            return Ok(());
        };
        if choice == 0 {
            return Ok(());
        }
        let Some(number) =
            input::read_choice(self.input, self.output, "Request number: ", pending.len())?
        else {
            return Ok(());
        };
        if number == 0 {
            return Ok(());
        }
        let index = number - 1;
        if choice == 1 {
            self.send_roster(RosterAction::ApproveAdminRequest { index }, "Approved.")
        } else {
            self.send_roster(RosterAction::RejectAdminRequest { index }, "Rejected.")
        }
    }

    fn reset_password(&mut self) -> io::Result<()> {
        let Some(username) = input::read_nonempty(self.input, self.output, "Username: ")? else {
            return Ok(());
        };
        let Some(new_password) =
            input::read_nonempty(self.input, self.output, "New password (4+ characters): ")?
        else {
            return Ok(());
        };
        self.send_roster(RosterAction::ResetPassword { username, new_password }, "Password reset.")
    }

    // ========================================================================
    // Pickers and dispatch helpers
    // ========================================================================

    /// Reads a product id and resolves whether the product is sized.
    /// Reports and backs out when no such product exists.
    fn pick_product(&mut self) -> io::Result<Option<(ProductId, bool)>> {
        let Some(id) = input::read_u32(self.input, self.output, "Product id: ")? else {
            return Ok(None);
        };
        let product_id = ProductId::new(id);
        match self.store.state().inventory.product(product_id).map(Product::has_size) {
            Some(sized) => Ok(Some((product_id, sized))),
            None => {
                writeln!(self.output, "No product with id {product_id}.")?;
                Ok(None)
            },
        }
    }

    fn pick_category(&mut self) -> io::Result<Option<Category>> {
        writeln!(self.output, "1. Men  2. Women  3. Kids  4. Other")?;
        let Some(choice) = input::read_choice(self.input, self.output, "Category: ", 4)? else {
            return Ok(None);
        };
        Ok(match choice {
            1 => Some(Category::Men),
            2 => Some(Category::Women),
            3 => Some(Category::Kids),
            4 => Some(Category::Other),
            _ => None,
        })
    }

    /// Section choices depend on the category; Other-category products
    /// always land in the Other section without a prompt.
    fn pick_section(&mut self, category: Category) -> io::Result<Option<Section>> {
        let Some(options) = Self::sections_for(category) else {
            return Ok(Some(Section::Other));
        };
        writeln!(self.output, "1. {}  2. {}  3. {}", options[0], options[1], options[2])?;
        let Some(choice) = input::read_choice(self.input, self.output, "Section: ", 3)? else {
            return Ok(None);
        };
        if choice == 0 {
            return Ok(None);
        }
        Ok(Some(options[choice - 1]))
    }

    /// The picker rows for a category, or nothing when the category has a
    /// single fixed section.
    const fn sections_for(category: Category) -> Option<[Section; 3]> {
        match category {
            Category::Men | Category::Women => {
                Some([Section::Eastern, Section::Western, Section::Other])
            },
            Category::Kids => Some([Section::Boys, Section::Girls, Section::Other]),
            Category::Other => None,
        }
    }

    fn pick_size(&mut self, sized: bool) -> io::Result<Option<Size>> {
        if !sized {
            return Ok(Some(Size::None));
        }
        writeln!(self.output, "1. XS  2. S  3. M  4. L  5. XL")?;
        let Some(choice) = input::read_choice(self.input, self.output, "Size: ", 5)? else {
            return Ok(None);
        };
        if choice == 0 {
            return Ok(None);
        }
        Ok(Some(Size::SIZED[choice - 1]))
    }

    fn send_cart(&mut self, action: CartAction, success: &str) -> io::Result<()> {
        self.store.send(EngineAction::Cart(action));
        let error = self.store.state().carts.last_error.clone();
        self.report_outcome(error, success)
    }

    fn send_inventory(&mut self, action: InventoryAction, success: &str) -> io::Result<()> {
        self.store.send(EngineAction::Inventory(action));
        let error = self.store.state().inventory.last_error.clone();
        self.report_outcome(error, success)
    }

    fn send_roster(&mut self, action: RosterAction, success: &str) -> io::Result<()> {
        self.store.send(EngineAction::Roster(action));
        let error = self.store.state().roster.last_error.clone();
        self.report_outcome(error, success)
    }
}
