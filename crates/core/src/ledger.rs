//! Money and deed operations.
//!
//! Every operation checks all of its inputs before it touches the session,
//! in the order listed on each function, and reports the first failure.
//! Balances are computed with checked arithmetic before anything is
//! written, so an amount that would overflow is rejected like any other
//! input. A rejected operation leaves the session exactly as it was. A successful
//! one appends at most one [`Transaction`] and returns the message shown to
//! the player.

use rust_decimal::Decimal;
use tracing::info;

use crate::{
    error::ValidationError,
    models::{FineDestination, Player, Property, Transaction, TransactionKind, STARTING_BALANCE},
    session::Session,
};

/// One game action with its already-parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Seat a new player.
    AddPlayer {
        /// Player name.
        name: String,
    },
    /// Pay a player from the bank.
    AddMoney {
        /// Receiving player.
        player: String,
        /// Amount credited.
        amount: Decimal,
        /// Why the money was added.
        reason: String,
    },
    /// Collect money from a player for the bank.
    DeductMoney {
        /// Paying player.
        player: String,
        /// Amount debited.
        amount: Decimal,
        /// Why the money was taken.
        reason: String,
    },
    /// Buy a property from the bank.
    BuyProperty {
        /// Buying player.
        player: String,
        /// Property name; created if the board does not know it yet.
        property: String,
        /// Purchase price.
        cost: Decimal,
    },
    /// Build on an owned property at the owner's expense.
    Build {
        /// Property to build on.
        property: String,
        /// Building label, e.g. `Hotel`.
        building: String,
        /// Building cost.
        price: Decimal,
    },
    /// Pay rent from one player to another.
    PayRent {
        /// Paying player.
        from: String,
        /// Receiving player.
        to: String,
        /// Rent amount.
        amount: Decimal,
        /// Property the rent is for, if given.
        property: Option<String>,
    },
    /// Pay a fine to the bank or onto Free Parking.
    PayFine {
        /// Paying player.
        player: String,
        /// Fine amount.
        amount: Decimal,
        /// Where the money goes.
        destination: FineDestination,
    },
    /// Hand a property from its owner to another player.
    TransferProperty {
        /// Property being handed over.
        property: String,
        /// Current owner; receives `cost`.
        from: String,
        /// New owner; pays `cost`.
        to: String,
        /// Agreed price.
        cost: Decimal,
    },
}

impl Action {
    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddPlayer { .. } => "add_player",
            Action::AddMoney { .. } => "add_money",
            Action::DeductMoney { .. } => "deduct_money",
            Action::BuyProperty { .. } => "buy_property",
            Action::Build { .. } => "build",
            Action::PayRent { .. } => "pay_rent",
            Action::PayFine { .. } => "pay_fine",
            Action::TransferProperty { .. } => "transfer_property",
        }
    }

    /// Run the action against `session`.
    pub fn apply(&self, session: &mut Session) -> Result<String, ValidationError> {
        match self {
            Action::AddPlayer { name } => add_player(session, name),
            Action::AddMoney {
                player,
                amount,
                reason,
            } => add_money(session, player, *amount, reason),
            Action::DeductMoney {
                player,
                amount,
                reason,
            } => deduct_money(session, player, *amount, reason),
            Action::BuyProperty {
                player,
                property,
                cost,
            } => buy_property(session, player, property, *cost),
            Action::Build {
                property,
                building,
                price,
            } => build_on_property(session, property, building, *price),
            Action::PayRent {
                from,
                to,
                amount,
                property,
            } => pay_rent(session, from, to, *amount, property.as_deref()),
            Action::PayFine {
                player,
                amount,
                destination,
            } => pay_fine(session, player, *amount, *destination),
            Action::TransferProperty {
                property,
                from,
                to,
                cost,
            } => transfer_property(session, property, from, to, *cost),
        }
    }
}

/// Seat a player with the starting balance.
///
/// Checks: name present; no player with the same name ignoring case.
pub fn add_player(session: &mut Session, name: &str) -> Result<String, ValidationError> {
    let name = require(name, "player name")?;
    if let Some(existing) = session.find_player(name) {
        return Err(ValidationError::DuplicatePlayer(existing.name.clone()));
    }

    session.players.push(Player::new(name));
    info!(player = %name, balance = %STARTING_BALANCE, "Player added");
    Ok(format!("Added {name} with {STARTING_BALANCE}."))
}

/// Credit a player from the bank.
///
/// Checks: player exists; reason present.
pub fn add_money(
    session: &mut Session,
    player: &str,
    amount: Decimal,
    reason: &str,
) -> Result<String, ValidationError> {
    let idx = locate_player(session, player)?;
    let reason = require(reason, "reason")?;
    let after = credit(&session.players[idx], amount)?;

    let player = &mut session.players[idx];
    player.balance = after;
    let name = player.name.clone();
    session.transactions.push(
        Transaction::new(TransactionKind::MoneyAdded, amount, reason).to_party(name.as_str()),
    );
    info!(player = %name, %amount, "Money added");
    Ok(format!("Added {amount} to {name}'s wallet. Reason: {reason}"))
}

/// Debit a player for the bank.
///
/// Checks: player exists; reason present; balance covers the amount.
pub fn deduct_money(
    session: &mut Session,
    player: &str,
    amount: Decimal,
    reason: &str,
) -> Result<String, ValidationError> {
    let idx = locate_player(session, player)?;
    let reason = require(reason, "reason")?;
    ensure_funds(&session.players[idx], amount)?;
    let after = debit(&session.players[idx], amount)?;

    let player = &mut session.players[idx];
    player.balance = after;
    let name = player.name.clone();
    session.transactions.push(
        Transaction::new(TransactionKind::MoneyDeducted, amount, reason)
            .from_player(name.as_str()),
    );
    info!(player = %name, %amount, "Money deducted");
    Ok(format!("Deducted {amount} from {name}'s wallet. Reason: {reason}"))
}

/// Buy a property from the bank, registering it on first purchase.
///
/// Checks: player exists; property name present; property not already
/// owned; balance covers the cost.
pub fn buy_property(
    session: &mut Session,
    player: &str,
    property: &str,
    cost: Decimal,
) -> Result<String, ValidationError> {
    let player_idx = locate_player(session, player)?;
    let property = require(property, "property name")?;
    let existing = session.property_index(property);
    if let Some(deed) = existing.map(|idx| &session.properties[idx]) {
        if let Some(owner) = &deed.owner {
            return Err(ValidationError::AlreadyOwned {
                property: deed.name.clone(),
                owner: owner.clone(),
            });
        }
    }
    ensure_funds(&session.players[player_idx], cost)?;
    let after = debit(&session.players[player_idx], cost)?;

    let property_idx = match existing {
        Some(idx) => idx,
        None => {
            session.properties.push(Property::new(property));
            session.properties.len() - 1
        }
    };
    let buyer = &mut session.players[player_idx];
    buyer.balance = after;
    let buyer = buyer.name.clone();
    let deed = &mut session.properties[property_idx];
    deed.owner = Some(buyer.clone());
    let deed = deed.name.clone();

    session.transactions.push(
        Transaction::new(TransactionKind::PropertyBuy, cost, format!("Bought {deed}"))
            .from_player(buyer.as_str())
            .on_property(deed.as_str()),
    );
    info!(player = %buyer, property = %deed, %cost, "Property bought");
    Ok(format!("{buyer} bought {deed} for {cost}."))
}

/// Build on a property, charging its owner.
///
/// Checks: property exists; property is owned; building type present;
/// owner's balance covers the price.
pub fn build_on_property(
    session: &mut Session,
    property: &str,
    building: &str,
    price: Decimal,
) -> Result<String, ValidationError> {
    let property_idx = locate_property(session, property)?;
    let deed = &session.properties[property_idx];
    let owner = deed
        .owner
        .clone()
        .ok_or_else(|| ValidationError::PropertyUnowned(deed.name.clone()))?;
    let building = require(building, "building type")?;
    let owner_idx = session
        .player_index(&owner)
        .ok_or_else(|| ValidationError::PlayerNotFound(owner.clone()))?;
    ensure_funds(&session.players[owner_idx], price)?;
    let after = debit(&session.players[owner_idx], price)?;

    let payer = &mut session.players[owner_idx];
    payer.balance = after;
    let payer = payer.name.clone();
    let deed = &mut session.properties[property_idx];
    deed.building = building.to_string();
    deed.build_price = price;
    let deed = deed.name.clone();

    session.transactions.push(
        Transaction::new(
            TransactionKind::Build,
            price,
            format!("Built {building} on {deed}"),
        )
        .from_player(payer.as_str())
        .on_property(deed.as_str()),
    );
    info!(player = %payer, property = %deed, %building, %price, "Building placed");
    Ok(format!("Built {building} on {deed} for {price}."))
}

/// Move rent from one player to another.
///
/// Checks: both players exist; payer's balance covers the amount.
pub fn pay_rent(
    session: &mut Session,
    from: &str,
    to: &str,
    amount: Decimal,
    property: Option<&str>,
) -> Result<String, ValidationError> {
    let from_idx = locate_player(session, from)?;
    let to_idx = locate_player(session, to)?;
    ensure_funds(&session.players[from_idx], amount)?;
    let (payer_after, payee_after) = exchange(session, from_idx, to_idx, amount)?;

    session.players[from_idx].balance = payer_after;
    session.players[to_idx].balance = payee_after;
    let payer = session.players[from_idx].name.clone();
    let payee = session.players[to_idx].name.clone();
    let property = property
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            session
                .find_property(name)
                .map(|deed| deed.name.clone())
                .unwrap_or_else(|| name.to_string())
        });
    let desc = match &property {
        Some(name) => format!("Rent paid for {name}"),
        None => "Rent paid".to_string(),
    };

    let mut entry = Transaction::new(TransactionKind::Rent, amount, desc)
        .from_player(payer.as_str())
        .to_party(payee.as_str());
    entry.property = property;
    session.transactions.push(entry);
    info!(from = %payer, to = %payee, %amount, "Rent paid");
    Ok(format!("{payer} paid {amount} rent to {payee}."))
}

/// Charge a fine. Free Parking is not a player, so nobody is credited.
///
/// Checks: player exists; balance covers the amount.
pub fn pay_fine(
    session: &mut Session,
    player: &str,
    amount: Decimal,
    destination: FineDestination,
) -> Result<String, ValidationError> {
    let idx = locate_player(session, player)?;
    ensure_funds(&session.players[idx], amount)?;
    let after = debit(&session.players[idx], amount)?;

    let payer = &mut session.players[idx];
    payer.balance = after;
    let payer = payer.name.clone();
    let mut entry = Transaction::new(TransactionKind::Fine, amount, destination.description())
        .from_player(payer.as_str());
    entry.to = destination.recipient().map(str::to_string);
    session.transactions.push(entry);
    info!(player = %payer, %amount, ?destination, "Fine paid");
    Ok(format!("{payer} paid {amount} fine."))
}

/// Hand a property from its owner to another player.
///
/// The current owner (`from`) is credited `cost` and the new owner (`to`)
/// is debited. Only the owner's balance is checked against `cost`, so the
/// new owner may end up below zero.
///
/// Checks: both players exist; property exists; `from` owns it; `from`'s
/// balance covers the cost.
pub fn transfer_property(
    session: &mut Session,
    property: &str,
    from: &str,
    to: &str,
    cost: Decimal,
) -> Result<String, ValidationError> {
    let from_idx = locate_player(session, from)?;
    let to_idx = locate_player(session, to)?;
    let property_idx = locate_property(session, property)?;
    let seller = session.players[from_idx].name.clone();
    if !session.properties[property_idx].is_owned_by(&seller) {
        return Err(ValidationError::NotOwner {
            player: seller,
            property: session.properties[property_idx].name.clone(),
        });
    }
    ensure_funds(&session.players[from_idx], cost)?;
    let (buyer_after, seller_after) = exchange(session, to_idx, from_idx, cost)?;

    session.players[from_idx].balance = seller_after;
    session.players[to_idx].balance = buyer_after;
    let buyer = session.players[to_idx].name.clone();
    let deed = &mut session.properties[property_idx];
    deed.owner = Some(buyer.clone());
    let deed = deed.name.clone();

    session.transactions.push(
        Transaction::new(
            TransactionKind::PropertyTransfer,
            cost,
            format!("Transferred {deed} for {cost}"),
        )
        .from_player(seller.as_str())
        .to_party(buyer.as_str())
        .on_property(deed.as_str()),
    );
    info!(from = %seller, to = %buyer, property = %deed, %cost, "Property transferred");
    Ok(format!("Transferred {deed} from {seller} to {buyer} for {cost}."))
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn locate_player(session: &Session, name: &str) -> Result<usize, ValidationError> {
    let name = require(name, "player name")?;
    session
        .player_index(name)
        .ok_or_else(|| ValidationError::PlayerNotFound(name.to_string()))
}

fn locate_property(session: &Session, name: &str) -> Result<usize, ValidationError> {
    let name = require(name, "property name")?;
    session
        .property_index(name)
        .ok_or_else(|| ValidationError::PropertyNotFound(name.to_string()))
}

fn credit(player: &Player, amount: Decimal) -> Result<Decimal, ValidationError> {
    player
        .balance
        .checked_add(amount)
        .ok_or_else(|| out_of_range(player, amount))
}

fn debit(player: &Player, amount: Decimal) -> Result<Decimal, ValidationError> {
    player
        .balance
        .checked_sub(amount)
        .ok_or_else(|| out_of_range(player, amount))
}

/// Balances after `payer` hands `amount` to `payee`; a player paying
/// themselves ends where they started.
fn exchange(
    session: &Session,
    payer: usize,
    payee: usize,
    amount: Decimal,
) -> Result<(Decimal, Decimal), ValidationError> {
    let payer_after = debit(&session.players[payer], amount)?;
    if payer == payee {
        return Ok((payer_after, session.players[payee].balance));
    }
    let payee_after = credit(&session.players[payee], amount)?;
    Ok((payer_after, payee_after))
}

fn out_of_range(player: &Player, amount: Decimal) -> ValidationError {
    ValidationError::AmountOutOfRange {
        player: player.name.clone(),
        amount,
    }
}

fn ensure_funds(player: &Player, required: Decimal) -> Result<(), ValidationError> {
    if player.balance < required {
        return Err(ValidationError::InsufficientBalance {
            player: player.name.clone(),
            balance: player.balance,
            required,
        });
    }
    Ok(())
}
