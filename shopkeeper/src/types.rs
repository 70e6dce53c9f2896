//! Domain types for the shopkeeper engine.
//!
//! The vocabulary of the whole system lives here: identifiers, money with
//! integer-cent arithmetic, the size-mode stock vector, the category/section
//! placement hierarchy, products, cart-facing shortage/resolution values, and
//! the immutable transaction records the ledger stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a product, assigned sequentially and never reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(u32);

impl ProductId {
    /// Creates a `ProductId` from its raw value
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an actor (customer or administrator)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates an `ActorId` from its raw value
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a transaction, unique within one actor's ledger book
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(u32);

impl TransactionId {
    /// Creates a `TransactionId` from its raw value
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Money amount in cents (avoids floating point issues)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a new `Money` amount from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` amount from dollars
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Checks if this amount is zero
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, `None` on overflow
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Subtracts an amount, `None` on underflow
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Multiplies by a unit count, `None` on overflow
    #[must_use]
    pub const fn checked_multiply(self, factor: u64) -> Option<Self> {
        match self.0.checked_mul(factor) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Two-decimal text without a currency symbol, as persisted on disk
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::str::FromStr for Money {
    type Err = String;

    /// Parses non-negative two-decimal text: `"12"`, `"12.5"`, `"12.50"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("amount cannot be empty".to_string());
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if !whole.chars().all(|c| c.is_ascii_digit()) || (whole.is_empty() && frac.is_empty()) {
            return Err(format!("invalid amount: {s}"));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid amount: {s}"));
        }

        let dollars: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| format!("invalid amount: {s}"))?
        };
        let cents_part: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| format!("invalid amount: {s}"))? * 10,
            _ => frac.parse().map_err(|_| format!("invalid amount: {s}"))?,
        };

        dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents_part))
            .map(Self)
            .ok_or_else(|| format!("amount out of range: {s}"))
    }
}

// ============================================================================
// Discount tiers
// ============================================================================

/// Discount rate as the integer percentage of the raw total that is kept.
///
/// `98` means the actor pays 98% of the raw total. Stored this way so the
/// discounted total is exact integer arithmetic, truncating fractional cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRate(u8);

impl DiscountRate {
    /// No discount: the full raw total is kept
    pub const FULL: Self = Self(100);

    /// Creates a rate from the percentage kept (clamped to 1..=100)
    #[must_use]
    pub const fn from_percent_kept(percent: u8) -> Self {
        if percent == 0 {
            Self(1)
        } else if percent > 100 {
            Self(100)
        } else {
            Self(percent)
        }
    }

    /// The percentage of the raw total that is kept
    #[must_use]
    pub const fn percent_kept(self) -> u8 {
        self.0
    }

    /// Applies the rate to an amount, truncating fractional cents
    #[must_use]
    pub const fn apply(self, amount: Money) -> Money {
        Money::from_cents(amount.cents() * self.0 as u64 / 100)
    }

    /// Decimal text as persisted on disk: `"1.00"`, `"0.98"`
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::str::FromStr for DiscountRate {
    type Err = String;

    /// Parses decimal text in (0, 1]: `"1"`, `"1.00"`, `"0.98"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount: Money = s.parse()?;
        let percent = amount.cents();
        if percent == 0 || percent > 100 {
            return Err(format!("discount rate out of range: {s}"));
        }
        #[allow(clippy::cast_possible_truncation)]
        let percent = percent as u8;
        Ok(Self(percent))
    }
}

/// Discount eligibility classification derived from cumulative spend
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Tier {
    /// Level 1, no discount
    #[default]
    Silver,
    /// Level 2, pays 98%
    Gold,
    /// Level 3, pays 95%
    Diamond,
}

impl Tier {
    /// Cumulative spend that upgrades to Gold
    pub const GOLD_AT: Money = Money::from_dollars(500);
    /// Cumulative spend that upgrades to Diamond
    pub const DIAMOND_AT: Money = Money::from_dollars(2000);

    /// The numeric level as persisted on disk
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Silver => 1,
            Self::Gold => 2,
            Self::Diamond => 3,
        }
    }

    /// Maps a stored level back to a tier (level ≤ 1 → Silver, 2 → Gold, 3+ → Diamond)
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Self::Silver,
            2 => Self::Gold,
            _ => Self::Diamond,
        }
    }

    /// The discount rate this tier is entitled to
    #[must_use]
    pub const fn discount_rate(self) -> DiscountRate {
        match self {
            Self::Silver => DiscountRate::FULL,
            Self::Gold => DiscountRate::from_percent_kept(98),
            Self::Diamond => DiscountRate::from_percent_kept(95),
        }
    }

    /// The tier a cumulative spend entitles an actor to
    #[must_use]
    pub fn for_spend(total_spent: Money) -> Self {
        if total_spent >= Self::DIAMOND_AT {
            Self::Diamond
        } else if total_spent >= Self::GOLD_AT {
            Self::Gold
        } else {
            Self::Silver
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Diamond => "Diamond",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Sizes and stock
// ============================================================================

/// Garment size; `None` is the sentinel slot used only by size-less products
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    /// Extra small
    Xs,
    /// Small
    S,
    /// Medium
    M,
    /// Large
    L,
    /// Extra large
    Xl,
    /// The single slot of a size-less product
    None,
}

impl Size {
    /// The five real sizes, in slot order
    pub const SIZED: [Self; 5] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl];

    /// Every slot, in storage order
    pub const ALL: [Self; 6] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl, Self::None];

    /// The storage slot for this size
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Xs => 0,
            Self::S => 1,
            Self::M => 2,
            Self::L => 3,
            Self::Xl => 4,
            Self::None => 5,
        }
    }

    /// Maps a storage slot back to a size
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Xs),
            1 => Some(Self::S),
            2 => Some(Self::M),
            3 => Some(Self::L),
            4 => Some(Self::Xl),
            5 => Some(Self::None),
            _ => Option::None,
        }
    }

    /// `true` for XS..XL, `false` for the size-less sentinel
    #[must_use]
    pub const fn is_real_size(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Xs => "XS",
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::Xl => "XL",
            Self::None => "None",
        };
        write!(f, "{name}")
    }
}

/// Initial stock supplied when a product is created; fixes the size mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockInit {
    /// A sized product with per-size quantities XS through XL
    Sized {
        /// Extra small quantity
        xs: u32,
        /// Small quantity
        s: u32,
        /// Medium quantity
        m: u32,
        /// Large quantity
        l: u32,
        /// Extra large quantity
        xl: u32,
    },
    /// A size-less product with a single total quantity
    Sizeless {
        /// Total quantity
        quantity: u32,
    },
}

impl From<StockInit> for SizeStock {
    fn from(init: StockInit) -> Self {
        match init {
            StockInit::Sized { xs, s, m, l, xl } => Self::new_sized(xs, s, m, l, xl),
            StockInit::Sizeless { quantity } => Self::new_sizeless(quantity),
        }
    }
}

/// Fixed-mode per-size quantity vector.
///
/// A sized product may hold stock only in XS..XL; a size-less product only in
/// the `None` slot. The mode is fixed at creation and never flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    sized: bool,
    slots: [u32; 6],
}

impl SizeStock {
    /// Creates stock for a sized product
    #[must_use]
    pub const fn new_sized(xs: u32, s: u32, m: u32, l: u32, xl: u32) -> Self {
        Self {
            sized: true,
            slots: [xs, s, m, l, xl, 0],
        }
    }

    /// Creates stock for a size-less product
    #[must_use]
    pub const fn new_sizeless(quantity: u32) -> Self {
        Self {
            sized: false,
            slots: [0, 0, 0, 0, 0, quantity],
        }
    }

    /// Infers the mode from raw slots loaded from disk.
    ///
    /// The file format does not store the mode: any nonzero XS..XL slot means
    /// sized; otherwise a nonzero `None` slot means size-less; an all-zero
    /// vector is treated as sized.
    #[must_use]
    pub fn from_slots_inferred(slots: [u32; 6]) -> Self {
        let any_sized = slots[..5].iter().any(|&q| q != 0);
        let sized = any_sized || slots[5] == 0;
        let slots = if sized {
            [slots[0], slots[1], slots[2], slots[3], slots[4], 0]
        } else {
            [0, 0, 0, 0, 0, slots[5]]
        };
        Self { sized, slots }
    }

    /// `true` when this product carries per-size stock
    #[must_use]
    pub const fn is_sized(self) -> bool {
        self.sized
    }

    /// `true` when `size` is legal for this product's mode
    #[must_use]
    pub const fn is_legal(self, size: Size) -> bool {
        self.sized == size.is_real_size()
    }

    /// The raw slot vector, in storage order
    #[must_use]
    pub const fn slots(self) -> [u32; 6] {
        self.slots
    }

    /// Quantity available for one size (0 for a mode-illegal size)
    #[must_use]
    pub const fn available(self, size: Size) -> u32 {
        self.slots[size.index()]
    }

    /// Total stock: Σ(XS..XL) when sized, else the `None` slot
    #[must_use]
    pub fn total(self) -> u32 {
        if self.sized {
            self.slots[..5].iter().sum()
        } else {
            self.slots[5]
        }
    }

    /// Sets one size's quantity absolutely.
    ///
    /// # Errors
    ///
    /// Rejects a size that is illegal for this product's mode.
    pub fn set(&mut self, size: Size, quantity: u32) -> Result<(), String> {
        if !self.is_legal(size) {
            return Err(mode_mismatch(self.sized, size));
        }
        self.slots[size.index()] = quantity;
        Ok(())
    }

    /// Deducts from one size's quantity, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Rejects a mode-illegal size or a deduction that would go negative; the
    /// slot is left unchanged on failure.
    pub fn deduct(&mut self, size: Size, quantity: u32) -> Result<(), String> {
        if !self.is_legal(size) {
            return Err(mode_mismatch(self.sized, size));
        }
        let slot = &mut self.slots[size.index()];
        match slot.checked_sub(quantity) {
            Some(remaining) => {
                *slot = remaining;
                Ok(())
            },
            None => Err(format!(
                "insufficient stock for size {size}: available {}, requested {quantity}",
                *slot
            )),
        }
    }

    /// Returns previously deducted quantity to a slot (commit rollback)
    pub fn restock(&mut self, size: Size, quantity: u32) {
        let slot = &mut self.slots[size.index()];
        *slot = slot.saturating_add(quantity);
    }
}

fn mode_mismatch(sized: bool, size: Size) -> String {
    if sized {
        format!("sized product cannot hold stock in the {size} slot")
    } else {
        format!("size-less product cannot hold stock for size {size}")
    }
}

// ============================================================================
// Categories, sections, placement
// ============================================================================

/// Top-level product category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Menswear
    Men,
    /// Womenswear
    Women,
    /// Children's wear
    Kids,
    /// Everything else (gift cards, accessories)
    Other,
}

impl Category {
    /// Every category, in storage order
    pub const ALL: [Self; 4] = [Self::Men, Self::Women, Self::Kids, Self::Other];

    /// The storage index for this category
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Men => 0,
            Self::Women => 1,
            Self::Kids => 2,
            Self::Other => 3,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Men => "Men",
            Self::Women => "Women",
            Self::Kids => "Kids",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// A section as requested by an actor, before category validation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    /// Eastern wear (Men/Women)
    Eastern,
    /// Western wear (Men/Women)
    Western,
    /// Boys' wear (Kids)
    Boys,
    /// Girls' wear (Kids)
    Girls,
    /// The catch-all section, legal in every category
    Other,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eastern => "Eastern",
            Self::Western => "Western",
            Self::Boys => "Boys",
            Self::Girls => "Girls",
            Self::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Sections available inside the Men and Women categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WardrobeSection {
    /// Eastern wear
    Eastern,
    /// Western wear
    Western,
    /// Everything else
    Other,
}

/// Sections available inside the Kids category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KidsSection {
    /// Boys' wear
    Boys,
    /// Girls' wear
    Girls,
    /// Everything else
    Other,
}

/// A validated (category, section) pairing.
///
/// The section variant is tagged per category so an invalid pairing is
/// unrepresentable once constructed; the bare index mapping of the file
/// format survives only in [`Placement::from_indices`] and
/// [`Placement::section_slot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Placement {
    /// A menswear section
    Men(WardrobeSection),
    /// A womenswear section
    Women(WardrobeSection),
    /// A kids section
    Kids(KidsSection),
    /// The Other category, which has only the Other section
    Other,
}

impl Placement {
    /// Every placement, in storage order
    pub const ALL: [Self; 10] = [
        Self::Men(WardrobeSection::Eastern),
        Self::Men(WardrobeSection::Western),
        Self::Men(WardrobeSection::Other),
        Self::Women(WardrobeSection::Eastern),
        Self::Women(WardrobeSection::Western),
        Self::Women(WardrobeSection::Other),
        Self::Kids(KidsSection::Boys),
        Self::Kids(KidsSection::Girls),
        Self::Kids(KidsSection::Other),
        Self::Other,
    ];

    /// Validates a requested (category, section) pair.
    ///
    /// The Other category pairs only with the Other section; any other
    /// request for it is auto-corrected rather than rejected. Cross-category
    /// sections (Kids with Eastern, Men with Boys) are rejected.
    ///
    /// # Errors
    ///
    /// Returns a message naming the invalid pairing.
    pub fn resolve(category: Category, section: Section) -> Result<Self, String> {
        match category {
            Category::Other => {
                if !matches!(section, Section::Other) {
                    tracing::warn!(
                        %category,
                        %section,
                        "Other category always uses the Other section, auto-corrected"
                    );
                }
                Ok(Self::Other)
            },
            Category::Men | Category::Women => {
                let wardrobe = match section {
                    Section::Eastern => WardrobeSection::Eastern,
                    Section::Western => WardrobeSection::Western,
                    Section::Other => WardrobeSection::Other,
                    Section::Boys | Section::Girls => {
                        return Err(format!("section {section} is not valid for {category}"));
                    },
                };
                Ok(if matches!(category, Category::Men) {
                    Self::Men(wardrobe)
                } else {
                    Self::Women(wardrobe)
                })
            },
            Category::Kids => {
                let kids = match section {
                    Section::Boys => KidsSection::Boys,
                    Section::Girls => KidsSection::Girls,
                    Section::Other => KidsSection::Other,
                    Section::Eastern | Section::Western => {
                        return Err(format!("section {section} is not valid for {category}"));
                    },
                };
                Ok(Self::Kids(kids))
            },
        }
    }

    /// Decodes the category-relative indices used by the file formats.
    ///
    /// # Errors
    ///
    /// Returns a message when either index is out of range.
    pub fn from_indices(category: usize, slot: usize) -> Result<Self, String> {
        let category = match category {
            0 => Category::Men,
            1 => Category::Women,
            2 => Category::Kids,
            3 => Category::Other,
            _ => return Err(format!("invalid category index: {category}")),
        };
        if slot > 2 {
            return Err(format!("invalid section index: {slot}"));
        }
        let section = match (category, slot) {
            (Category::Other, _) => Section::Other,
            (Category::Kids, 0) => Section::Boys,
            (Category::Kids, 1) => Section::Girls,
            (Category::Men | Category::Women, 0) => Section::Eastern,
            (Category::Men | Category::Women, 1) => Section::Western,
            _ => Section::Other,
        };
        Self::resolve(category, section)
    }

    /// The category this placement belongs to
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Men(_) => Category::Men,
            Self::Women(_) => Category::Women,
            Self::Kids(_) => Category::Kids,
            Self::Other => Category::Other,
        }
    }

    /// The flat section name, for display and request echoing
    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::Men(w) | Self::Women(w) => match w {
                WardrobeSection::Eastern => Section::Eastern,
                WardrobeSection::Western => Section::Western,
                WardrobeSection::Other => Section::Other,
            },
            Self::Kids(k) => match k {
                KidsSection::Boys => Section::Boys,
                KidsSection::Girls => Section::Girls,
                KidsSection::Other => Section::Other,
            },
            Self::Other => Section::Other,
        }
    }

    /// The category index as persisted on disk
    #[must_use]
    pub const fn category_index(self) -> usize {
        self.category().index()
    }

    /// The category-relative section index as persisted on disk
    #[must_use]
    pub const fn section_slot(self) -> usize {
        match self {
            Self::Men(w) | Self::Women(w) => match w {
                WardrobeSection::Eastern => 0,
                WardrobeSection::Western => 1,
                WardrobeSection::Other => 2,
            },
            Self::Kids(k) => match k {
                KidsSection::Boys => 0,
                KidsSection::Girls => 1,
                KidsSection::Other => 2,
            },
            Self::Other => 2,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category(), self.section())
    }
}

// ============================================================================
// Products
// ============================================================================

/// A product owned by the inventory index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,
    /// Unique product name
    pub name: String,
    /// Validated category/section placement
    pub placement: Placement,
    /// Unit price
    pub price: Money,
    /// Per-size stock with its fixed mode
    pub stock: SizeStock,
}

impl Product {
    /// Creates a new product
    #[must_use]
    pub const fn new(
        id: ProductId,
        name: String,
        placement: Placement,
        price: Money,
        stock: SizeStock,
    ) -> Self {
        Self {
            id,
            name,
            placement,
            price,
            stock,
        }
    }

    /// `true` when the product carries per-size stock
    #[must_use]
    pub const fn has_size(&self) -> bool {
        self.stock.is_sized()
    }

    /// Total stock across the mode's legal slots
    #[must_use]
    pub fn total_stock(&self) -> u32 {
        self.stock.total()
    }
}

// ============================================================================
// Shortages and resolutions
// ============================================================================

/// The gap between a cart request and currently available stock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    /// Product the cart references
    pub product_id: ProductId,
    /// The size slot that is short
    pub size: Size,
    /// Quantity the cart requests
    pub requested: u32,
    /// Quantity currently available (0 when the product was removed)
    pub available: u32,
}

impl Shortage {
    /// How many units are missing
    #[must_use]
    pub const fn missing(self) -> u32 {
        self.requested.saturating_sub(self.available)
    }
}

/// One actor choice inside the shortage resolution loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Reduce the requested quantity for one (product, size) to what is available
    ReduceToAvailable {
        /// Product to adjust
        product_id: ProductId,
        /// Size slot to adjust
        size: Size,
    },
    /// Remove the whole cart line for a product
    RemoveItem {
        /// Product to remove
        product_id: ProductId,
    },
    /// Abort the whole checkout
    Abort,
}

// ============================================================================
// Transactions
// ============================================================================

/// Immutable snapshot of one cart line at checkout time.
///
/// Deliberately decoupled from the live `Product` so later price or placement
/// edits never retroactively alter history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    /// Product identifier at purchase time
    pub product_id: ProductId,
    /// Product name at purchase time
    pub name: String,
    /// Placement at purchase time
    pub placement: Placement,
    /// Unit price at purchase time
    pub unit_price: Money,
    /// Purchased quantities per size slot
    pub quantities: [u32; 6],
    /// `unit_price × Σ quantities`
    pub subtotal: Money,
}

impl TransactionItem {
    /// Snapshots a product against the purchased quantities.
    ///
    /// # Errors
    ///
    /// Fails when the subtotal overflows.
    pub fn snapshot(product: &Product, quantities: [u32; 6]) -> Result<Self, String> {
        let total_quantity: u64 = quantities.iter().map(|&q| u64::from(q)).sum();
        let subtotal = product
            .price
            .checked_multiply(total_quantity)
            .ok_or_else(|| format!("subtotal overflows for product {}", product.id))?;
        Ok(Self {
            product_id: product.id,
            name: product.name.clone(),
            placement: product.placement,
            unit_price: product.price,
            quantities,
            subtotal,
        })
    }

    /// Units purchased across all size slots
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.quantities.iter().sum()
    }
}

/// An immutable, committed checkout record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier within the owning actor's ledger book
    pub id: TransactionId,
    /// The purchasing actor
    pub actor_id: ActorId,
    /// Snapshotted cart lines
    pub items: Vec<TransactionItem>,
    /// Sum of item subtotals
    pub raw_total: Money,
    /// Rate applied at purchase time
    pub discount_rate: DiscountRate,
    /// `raw_total × discount_rate`
    pub final_total: Money,
    /// When the checkout committed
    pub timestamp: DateTime<Utc>,
    /// The actor's tier at purchase time
    pub tier: Tier,
}

// ============================================================================
// Actors
// ============================================================================

/// An account in the roster
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    /// Actor identifier
    pub id: ActorId,
    /// Unique login name
    pub username: String,
    /// Plaintext password (credential storage hardening is out of scope)
    pub password: String,
    /// Current discount tier
    pub tier: Tier,
    /// `true` for administrators
    pub is_admin: bool,
    /// Cumulative committed spend
    pub total_spent: Money,
}

/// A queued request for an administrator account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequest {
    /// Requested login name
    pub username: String,
    /// Requested password
    pub password: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn money_parses_two_decimal_text() {
        assert_eq!("123.45".parse::<Money>().unwrap(), Money::from_cents(12345));
        assert_eq!("123".parse::<Money>().unwrap(), Money::from_dollars(123));
        assert_eq!("0.5".parse::<Money>().unwrap(), Money::from_cents(50));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_cents(50));
        assert_eq!("0.05".parse::<Money>().unwrap(), Money::from_cents(5));
    }

    #[test]
    fn money_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("-3".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("12a".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn money_decimal_string_round_trips() {
        let amount = Money::from_cents(100_05);
        assert_eq!(amount.to_decimal_string(), "100.05");
        assert_eq!(amount.to_decimal_string().parse::<Money>().unwrap(), amount);
    }

    #[test]
    fn discount_rate_applies_with_truncation() {
        let rate = DiscountRate::from_percent_kept(95);
        assert_eq!(rate.apply(Money::from_dollars(1000)), Money::from_dollars(950));
        // 123456 * 95 / 100 = 117283.2 -> truncates
        assert_eq!(
            rate.apply(Money::from_cents(123_456)),
            Money::from_cents(117_283)
        );
        assert_eq!(DiscountRate::FULL.apply(Money::from_cents(999)), Money::from_cents(999));
    }

    #[test]
    fn discount_rate_parses_stored_text() {
        assert_eq!("1.00".parse::<DiscountRate>().unwrap(), DiscountRate::FULL);
        assert_eq!(
            "0.98".parse::<DiscountRate>().unwrap(),
            DiscountRate::from_percent_kept(98)
        );
        assert!("0".parse::<DiscountRate>().is_err());
        assert!("1.01".parse::<DiscountRate>().is_err());
    }

    #[test]
    fn tier_thresholds_upgrade_and_never_exceed_diamond() {
        assert_eq!(Tier::for_spend(Money::from_dollars(499)), Tier::Silver);
        assert_eq!(Tier::for_spend(Money::from_dollars(500)), Tier::Gold);
        assert_eq!(Tier::for_spend(Money::from_dollars(1999)), Tier::Gold);
        assert_eq!(Tier::for_spend(Money::from_dollars(2000)), Tier::Diamond);
        assert_eq!(Tier::for_spend(Money::from_dollars(1_000_000)), Tier::Diamond);
    }

    #[test]
    fn tier_levels_round_trip() {
        for tier in [Tier::Silver, Tier::Gold, Tier::Diamond] {
            assert_eq!(Tier::from_level(tier.level()), tier);
        }
        assert_eq!(Tier::from_level(0), Tier::Silver);
        assert_eq!(Tier::from_level(9), Tier::Diamond);
    }

    #[test]
    fn scenario_d_discount_math() {
        let rate = Tier::Diamond.discount_rate();
        let raw = Money::from_dollars(1000);
        let final_total = rate.apply(raw);
        assert_eq!(final_total, Money::from_dollars(950));
        assert_eq!(raw.checked_sub(final_total).unwrap(), Money::from_dollars(50));
    }

    #[test]
    fn sized_stock_keeps_none_slot_empty() {
        let mut stock = SizeStock::new_sized(1, 2, 3, 4, 5);
        assert!(stock.is_sized());
        assert_eq!(stock.total(), 15);
        assert_eq!(stock.available(Size::None), 0);
        assert!(stock.set(Size::None, 7).is_err());
        assert_eq!(stock.available(Size::None), 0);
    }

    #[test]
    fn sizeless_stock_keeps_real_slots_empty() {
        let mut stock = SizeStock::new_sizeless(1000);
        assert!(!stock.is_sized());
        assert_eq!(stock.total(), 1000);
        for size in Size::SIZED {
            assert_eq!(stock.available(size), 0);
            assert!(stock.set(size, 3).is_err());
        }
        assert!(stock.set(Size::None, 500).is_ok());
        assert_eq!(stock.total(), 500);
    }

    #[test]
    fn deduct_is_all_or_nothing() {
        let mut stock = SizeStock::new_sized(0, 5, 0, 0, 0);
        assert!(stock.deduct(Size::S, 6).is_err());
        assert_eq!(stock.available(Size::S), 5);
        assert!(stock.deduct(Size::S, 5).is_ok());
        assert_eq!(stock.available(Size::S), 0);
    }

    #[test]
    fn restock_reverses_deduct() {
        let mut stock = SizeStock::new_sized(0, 5, 0, 0, 0);
        stock.deduct(Size::S, 3).unwrap();
        stock.restock(Size::S, 3);
        assert_eq!(stock.available(Size::S), 5);
    }

    #[test]
    fn mode_inference_matches_legacy_rule() {
        // any nonzero real size -> sized
        let stock = SizeStock::from_slots_inferred([0, 3, 0, 0, 0, 9]);
        assert!(stock.is_sized());
        assert_eq!(stock.available(Size::None), 0);
        // only the None slot -> size-less
        let stock = SizeStock::from_slots_inferred([0, 0, 0, 0, 0, 9]);
        assert!(!stock.is_sized());
        assert_eq!(stock.total(), 9);
        // all-zero -> sized
        assert!(SizeStock::from_slots_inferred([0; 6]).is_sized());
    }

    #[test]
    fn placement_resolves_valid_pairs() {
        assert_eq!(
            Placement::resolve(Category::Men, Section::Eastern).unwrap(),
            Placement::Men(WardrobeSection::Eastern)
        );
        assert_eq!(
            Placement::resolve(Category::Kids, Section::Girls).unwrap(),
            Placement::Kids(KidsSection::Girls)
        );
        assert_eq!(
            Placement::resolve(Category::Women, Section::Other).unwrap(),
            Placement::Women(WardrobeSection::Other)
        );
    }

    #[test]
    fn placement_rejects_cross_category_sections() {
        assert!(Placement::resolve(Category::Kids, Section::Eastern).is_err());
        assert!(Placement::resolve(Category::Kids, Section::Western).is_err());
        assert!(Placement::resolve(Category::Men, Section::Boys).is_err());
        assert!(Placement::resolve(Category::Women, Section::Girls).is_err());
    }

    #[test]
    fn other_category_auto_corrects_section() {
        assert_eq!(
            Placement::resolve(Category::Other, Section::Eastern).unwrap(),
            Placement::Other
        );
        assert_eq!(
            Placement::resolve(Category::Other, Section::Other).unwrap(),
            Placement::Other
        );
    }

    #[test]
    fn placement_indices_round_trip() {
        for placement in Placement::ALL {
            let decoded =
                Placement::from_indices(placement.category_index(), placement.section_slot())
                    .unwrap();
            assert_eq!(decoded, placement);
        }
        assert!(Placement::from_indices(4, 0).is_err());
        assert!(Placement::from_indices(0, 3).is_err());
    }

    #[test]
    fn snapshot_computes_subtotal() {
        let product = Product::new(
            ProductId::new(1),
            "Shirt".to_string(),
            Placement::Men(WardrobeSection::Eastern),
            Money::from_dollars(100),
            SizeStock::new_sized(0, 5, 0, 0, 0),
        );
        let item = TransactionItem::snapshot(&product, [0, 3, 0, 0, 0, 0]).unwrap();
        assert_eq!(item.subtotal, Money::from_dollars(300));
        assert_eq!(item.total_quantity(), 3);
        assert_eq!(item.name, "Shirt");
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn money_decimal_text_round_trips(cents in 0u64..=10_000_000_00) {
                let amount = Money::from_cents(cents);
                let text = amount.to_decimal_string();
                prop_assert_eq!(text.parse::<Money>().unwrap(), amount);
            }

            #[test]
            fn inferred_mode_never_mixes_slots(slots in proptest::array::uniform6(0u32..100)) {
                let stock = SizeStock::from_slots_inferred(slots);
                if stock.is_sized() {
                    prop_assert_eq!(stock.available(Size::None), 0);
                } else {
                    for size in Size::SIZED {
                        prop_assert_eq!(stock.available(size), 0);
                    }
                }
            }

            #[test]
            fn total_matches_mode(slots in proptest::array::uniform6(0u32..100)) {
                let stock = SizeStock::from_slots_inferred(slots);
                let expected: u32 = if stock.is_sized() {
                    stock.slots()[..5].iter().sum()
                } else {
                    stock.slots()[5]
                };
                prop_assert_eq!(stock.total(), expected);
            }
        }
    }
}
