use banker_core::{Action, FineDestination, ValidationError};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::input::parse_amount;

/// Shown by a player selector before anyone is picked.
pub const SELECT_PLAYER: &str = "Select Player";
const MAX_INPUT_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddPlayer,
    AddMoney,
    DeductMoney,
    BuyProperty,
    Build,
    PayRent,
    PayFine,
    TransferProperty,
}

impl FormKind {
    pub const ALL: [FormKind; 8] = [
        FormKind::AddPlayer,
        FormKind::AddMoney,
        FormKind::DeductMoney,
        FormKind::BuyProperty,
        FormKind::Build,
        FormKind::PayRent,
        FormKind::PayFine,
        FormKind::TransferProperty,
    ];

    pub fn title(self) -> &'static str {
        match self {
            FormKind::AddPlayer => "Add Player",
            FormKind::AddMoney => "Add Money",
            FormKind::DeductMoney => "Deduct Money",
            FormKind::BuyProperty => "Buy Property",
            FormKind::Build => "Build on Property",
            FormKind::PayRent => "Pay Rent",
            FormKind::PayFine => "Pay Fine",
            FormKind::TransferProperty => "Transfer Property",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            FormKind::AddPlayer => 'a',
            FormKind::AddMoney => 'm',
            FormKind::DeductMoney => 'd',
            FormKind::BuyProperty => 'b',
            FormKind::Build => 'h',
            FormKind::PayRent => 'r',
            FormKind::PayFine => 'f',
            FormKind::TransferProperty => 't',
        }
    }

    pub fn from_shortcut(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.shortcut() == ch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choice {
        options: Vec<String>,
        selected: Option<usize>,
    },
    Toggle(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Text(String::new()),
        }
    }

    /// Selector over `players`, or a free-text field when nobody is seated.
    fn player(label: &'static str, players: &[String]) -> Self {
        if players.is_empty() {
            return Self::text(label);
        }
        Self {
            label,
            value: FieldValue::Choice {
                options: players.to_vec(),
                selected: None,
            },
        }
    }

    fn choice(label: &'static str, options: &[String]) -> Self {
        Self {
            label,
            value: FieldValue::Choice {
                options: options.to_vec(),
                selected: if options.is_empty() { None } else { Some(0) },
            },
        }
    }

    fn toggle(label: &'static str, on: bool) -> Self {
        Self {
            label,
            value: FieldValue::Toggle(on),
        }
    }

    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(input) => input.clone(),
            FieldValue::Choice { options, selected } => {
                let current = selected
                    .and_then(|idx| options.get(idx))
                    .map(String::as_str)
                    .unwrap_or(SELECT_PLAYER);
                format!("< {current} >")
            }
            FieldValue::Toggle(true) => "[x]".to_string(),
            FieldValue::Toggle(false) => "[ ]".to_string(),
        }
    }

    fn as_text(&self) -> String {
        match &self.value {
            FieldValue::Text(input) => input.clone(),
            FieldValue::Choice { options, selected } => selected
                .and_then(|idx| options.get(idx))
                .cloned()
                .unwrap_or_default(),
            FieldValue::Toggle(_) => String::new(),
        }
    }

    fn as_flag(&self) -> bool {
        matches!(self.value, FieldValue::Toggle(true))
    }

    fn cycle(&mut self, delta: isize) {
        match &mut self.value {
            FieldValue::Choice { options, selected } if !options.is_empty() => {
                let len = options.len() as isize;
                let next = match *selected {
                    None if delta < 0 => len - 1,
                    None => 0,
                    Some(idx) => (idx as isize + delta).rem_euclid(len),
                };
                *selected = Some(next as usize);
            }
            FieldValue::Toggle(on) => *on = !*on,
            _ => {}
        }
    }

    fn insert(&mut self, ch: char) {
        if let FieldValue::Text(input) = &mut self.value {
            if input.chars().count() < MAX_INPUT_LEN && !ch.is_control() {
                input.push(ch);
            }
        } else if ch == ' ' {
            self.cycle(1);
        }
    }

    fn backspace(&mut self) {
        if let FieldValue::Text(input) = &mut self.value {
            input.pop();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Pending,
    Submit,
    Cancel,
}

/// Modal form collecting the arguments of one [`Action`].
#[derive(Debug, Clone)]
pub struct ActionForm {
    kind: FormKind,
    fields: Vec<Field>,
    focus: usize,
}

impl ActionForm {
    pub fn new(kind: FormKind, players: &[String], building_types: &[String]) -> Self {
        let fields = match kind {
            FormKind::AddPlayer => vec![Field::text("Name")],
            FormKind::AddMoney | FormKind::DeductMoney => vec![
                Field::player("Player", players),
                Field::text("Amount"),
                Field::text("Reason"),
            ],
            FormKind::BuyProperty => vec![
                Field::player("Player", players),
                Field::text("Property"),
                Field::text("Cost"),
            ],
            FormKind::Build => vec![
                Field::text("Property"),
                Field::choice("Building", building_types),
                Field::text("Price"),
            ],
            FormKind::PayRent => vec![
                Field::player("From", players),
                Field::player("To", players),
                Field::text("Amount"),
                Field::text("Property (optional)"),
            ],
            FormKind::PayFine => vec![
                Field::player("Player", players),
                Field::text("Amount"),
                Field::toggle("To bank", true),
            ],
            FormKind::TransferProperty => vec![
                Field::text("Property"),
                Field::player("From", players),
                Field::player("To", players),
                Field::text("Cost"),
            ],
        };
        Self {
            kind,
            fields,
            focus: 0,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            KeyCode::Left => self.fields[self.focus].cycle(-1),
            KeyCode::Right => self.fields[self.focus].cycle(1),
            KeyCode::Backspace => self.fields[self.focus].backspace(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.fields[self.focus].insert(ch);
                }
            }
            _ => {}
        }
        FormOutcome::Pending
    }

    /// Build the action; amounts are parsed here, everything else is left to
    /// the ledger's checks.
    pub fn to_action(&self) -> Result<Action, ValidationError> {
        let text = |idx: usize| self.fields[idx].as_text();
        let amount = |idx: usize| parse_amount(&self.fields[idx].as_text());
        let action = match self.kind {
            FormKind::AddPlayer => Action::AddPlayer { name: text(0) },
            FormKind::AddMoney => Action::AddMoney {
                amount: amount(1)?,
                player: text(0),
                reason: text(2),
            },
            FormKind::DeductMoney => Action::DeductMoney {
                amount: amount(1)?,
                player: text(0),
                reason: text(2),
            },
            FormKind::BuyProperty => Action::BuyProperty {
                cost: amount(2)?,
                player: text(0),
                property: text(1),
            },
            FormKind::Build => Action::Build {
                price: amount(2)?,
                property: text(0),
                building: text(1),
            },
            FormKind::PayRent => {
                let property = text(3).trim().to_string();
                Action::PayRent {
                    amount: amount(2)?,
                    from: text(0),
                    to: text(1),
                    property: (!property.is_empty()).then_some(property),
                }
            }
            FormKind::PayFine => Action::PayFine {
                amount: amount(1)?,
                player: text(0),
                destination: FineDestination::from_to_bank(self.fields[2].as_flag()),
            },
            FormKind::TransferProperty => Action::TransferProperty {
                cost: amount(3)?,
                property: text(0),
                from: text(1),
                to: text(2),
            },
        };
        Ok(action)
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn players() -> Vec<String> {
        vec!["Alice".to_string(), "Bob".to_string()]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(form: &mut ActionForm, text: &str) {
        for ch in text.chars() {
            form.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn shortcuts_map_to_every_form() {
        for kind in FormKind::ALL {
            assert_eq!(FormKind::from_shortcut(kind.shortcut()), Some(kind));
        }
        assert_eq!(FormKind::from_shortcut('z'), None);
    }

    #[test]
    fn player_fields_fall_back_to_text_without_players() {
        let form = ActionForm::new(FormKind::AddMoney, &[], &[]);
        assert_eq!(form.fields()[0].value, FieldValue::Text(String::new()));

        let form = ActionForm::new(FormKind::AddMoney, &players(), &[]);
        assert_eq!(form.fields()[0].display(), "< Select Player >");
    }

    #[test]
    fn rent_form_builds_action() {
        let mut form = ActionForm::new(FormKind::PayRent, &players(), &[]);
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Left));
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "Rs. 200");
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormOutcome::Submit);

        assert_eq!(
            form.to_action(),
            Ok(Action::PayRent {
                from: "Alice".to_string(),
                to: "Bob".to_string(),
                amount: dec!(200),
                property: None,
            })
        );
    }

    #[test]
    fn fine_toggle_defaults_to_bank() {
        let mut form = ActionForm::new(FormKind::PayFine, &[], &[]);
        type_text(&mut form, "Alice");
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "1,000");
        let Ok(Action::PayFine { destination, amount, .. }) = form.to_action() else {
            panic!("expected a fine");
        };
        assert_eq!(destination, FineDestination::Bank);
        assert_eq!(amount, dec!(1000));

        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Char(' ')));
        let Ok(Action::PayFine { destination, .. }) = form.to_action() else {
            panic!("expected a fine");
        };
        assert_eq!(destination, FineDestination::FreeParking);
    }

    #[test]
    fn build_form_offers_configured_buildings() {
        let buildings = vec!["Shack".to_string(), "Tower".to_string()];
        let mut form = ActionForm::new(FormKind::Build, &players(), &buildings);
        type_text(&mut form, "Park Lane");
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Down));
        type_text(&mut form, "500");
        assert_eq!(
            form.to_action(),
            Ok(Action::Build {
                property: "Park Lane".to_string(),
                building: "Tower".to_string(),
                price: dec!(500),
            })
        );
    }

    #[test]
    fn bad_amount_is_reported_before_the_ledger_runs() {
        let mut form = ActionForm::new(FormKind::BuyProperty, &players(), &[]);
        form.handle_key(key(KeyCode::BackTab));
        type_text(&mut form, "lots");
        assert_eq!(form.focus(), 2);
        assert_eq!(
            form.to_action(),
            Err(ValidationError::InvalidAmount("lots".to_string()))
        );
    }

    #[test]
    fn unselected_player_reaches_ledger_as_empty_name() {
        let mut form = ActionForm::new(FormKind::DeductMoney, &players(), &[]);
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "50");
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut form, "Tax");
        form.handle_key(key(KeyCode::Backspace));
        assert_eq!(
            form.to_action(),
            Ok(Action::DeductMoney {
                player: String::new(),
                amount: dec!(50),
                reason: "Ta".to_string(),
            })
        );
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormOutcome::Cancel);
    }
}
