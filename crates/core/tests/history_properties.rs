//! Property-based tests for the bank's ledger and undo history.

use banker_core::{session::codec, Action, Bank, FineDestination, MemoryStore};
use proptest::prelude::*;
use rust_decimal::Decimal;

const NAMES: [&str; 3] = ["Alice", "Bob", "Carol"];
const DEEDS: [&str; 3] = ["Park Lane", "Mayfair", "Old Kent Road"];

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES.to_vec()).prop_map(str::to_string)
}

fn deed() -> impl Strategy<Value = String> {
    prop::sample::select(DEEDS.to_vec()).prop_map(str::to_string)
}

fn amount() -> BoxedStrategy<Decimal> {
    (0i64..40_000).prop_map(Decimal::from).boxed()
}

// Negative amounts, fractional amounts and the edges of the Decimal range.
fn any_amount() -> BoxedStrategy<Decimal> {
    prop_oneof![
        4 => (-40_000i64..40_000).prop_map(Decimal::from),
        2 => (any::<i64>(), 0u32..=28)
            .prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale)),
        1 => prop::sample::select(vec![Decimal::MAX, Decimal::MIN, Decimal::NEGATIVE_ONE]),
    ]
    .boxed()
}

// Every variant except transfers, which may push the buyer below zero.
fn checked_action(amount: BoxedStrategy<Decimal>) -> impl Strategy<Value = Action> {
    prop_oneof![
        name().prop_map(|name| Action::AddPlayer { name }),
        (name(), amount.clone()).prop_map(|(player, amount)| Action::AddMoney {
            player,
            amount,
            reason: "Passed GO".to_string(),
        }),
        (name(), amount.clone()).prop_map(|(player, amount)| Action::DeductMoney {
            player,
            amount,
            reason: "Tax".to_string(),
        }),
        (name(), deed(), amount.clone()).prop_map(|(player, property, cost)| Action::BuyProperty {
            player,
            property,
            cost,
        }),
        (deed(), amount.clone()).prop_map(|(property, price)| Action::Build {
            property,
            building: "Hotel".to_string(),
            price,
        }),
        (name(), name(), amount.clone()).prop_map(|(from, to, amount)| Action::PayRent {
            from,
            to,
            amount,
            property: None,
        }),
        (name(), amount, any::<bool>()).prop_map(|(player, amount, to_bank)| {
            Action::PayFine {
                player,
                amount,
                destination: FineDestination::from_to_bank(to_bank),
            }
        }),
    ]
}

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => checked_action(any_amount()),
        1 => (deed(), name(), name(), any_amount()).prop_map(|(property, from, to, cost)| {
            Action::TransferProperty {
                property,
                from,
                to,
                cost,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn checked_debits_never_go_negative(
        actions in prop::collection::vec(checked_action(amount()), 0..40)
    ) {
        let mut bank = Bank::new(MemoryStore::new());
        for action in &actions {
            bank.execute(action);
            for player in &bank.session().players {
                prop_assert!(player.balance >= Decimal::ZERO, "{} went negative", player.name);
            }
        }
    }

    #[test]
    fn rejected_actions_change_nothing(actions in prop::collection::vec(any_action(), 0..40)) {
        let mut bank = Bank::new(MemoryStore::new());
        for action in &actions {
            let before = bank.session().clone();
            let recorded = bank.history().len();
            let feedback = bank.execute(action);
            if !feedback.success {
                prop_assert_eq!(bank.session(), &before);
                prop_assert_eq!(bank.history().len(), recorded);
            } else {
                prop_assert!(bank.session().transactions.len() <= before.transactions.len() + 1);
            }
        }
    }

    #[test]
    fn undo_then_redo_restores_every_state(actions in prop::collection::vec(any_action(), 0..30)) {
        let mut bank = Bank::new(MemoryStore::new());
        let mut states = vec![bank.session().clone()];
        for action in &actions {
            if bank.execute(action).success {
                states.push(bank.session().clone());
            }
        }

        for expected in states.iter().rev().skip(1) {
            prop_assert!(bank.undo().success);
            prop_assert_eq!(bank.session(), expected);
        }
        prop_assert!(!bank.undo().success);

        for expected in states.iter().skip(1) {
            prop_assert!(bank.redo().success);
            prop_assert_eq!(bank.session(), expected);
        }
        prop_assert!(!bank.redo().success);
        prop_assert_eq!(bank.history().current(), bank.session());
    }

    #[test]
    fn saved_sessions_decode_exactly(actions in prop::collection::vec(any_action(), 0..30)) {
        let mut bank = Bank::new(MemoryStore::new());
        for action in &actions {
            bank.execute(action);
        }
        let bytes = codec::encode(bank.session())
            .map_err(|err| TestCaseError::fail(format!("{err:#}")))?;
        let restored = codec::decode(&bytes)
            .map_err(|err| TestCaseError::fail(format!("{err:#}")))?;
        prop_assert_eq!(&restored, bank.session());
    }
}
