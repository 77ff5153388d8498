use console::filter::BEDROOM_OPTIONS;
use console::form::PropertyDraft;
use requester::inventory::io::{ConsignationType, PropertyId};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
city <text>        type into the city field (no text clears the city)
select <n>         pick the n-th city suggestion
focus | dismiss    open or close the city suggestions
search <text>      free-text search (no text clears it)
min <price>        minimum price (blank clears)
max <price>        maximum price (blank clears)
bed <1-5>          toggle a bedroom count
type rent|sale|any consignation type
per-page <n>       page size
next | prev        move between pages
page <n>           jump to a page
reset              drop every filter
show               print the current page
get <id>           print one property
delete <id>        delete a property
new                start a property form
edit <id>          load a property into the form
set <field> <v>    title, description, address, bedrooms, bathrooms, area,
                   rent, sale (blank clears a price) or type rent|sale
image add          add an image slot
image set <n> <u>  set the n-th image url
image rm <n>       remove the n-th image slot (the first one stays)
save | cancel      submit or discard the form
help               print this help
quit               exit

While a form is open, city/select/focus/dismiss act on the form's city.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    City(String),
    Select(usize),
    Focus,
    Dismiss,
    Search(String),
    MinPrice(String),
    MaxPrice(String),
    ToggleBedroom(u32),
    Consignation(Option<ConsignationType>),
    PerPage(u32),
    Next,
    Previous,
    Page(u32),
    Reset,
    Show,
    Get(PropertyId),
    Delete(PropertyId),
    New,
    Edit(PropertyId),
    Set(FieldValue),
    Image(ImageAction),
    Save,
    Cancel,
    Help,
    Quit,
}

/// A form field together with its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Title(String),
    Description(String),
    Address(String),
    Bedrooms(i32),
    Bathrooms(i32),
    Area(f64),
    RentPrice(Option<f64>),
    SalePrice(Option<f64>),
    Consignation(ConsignationType),
}

impl FieldValue {
    pub fn apply_to(self, draft: &mut PropertyDraft) {
        match self {
            Self::Title(title) => draft.title = title,
            Self::Description(description) => draft.description = description,
            Self::Address(address) => draft.address = address,
            Self::Bedrooms(n) => draft.bedrooms = n,
            Self::Bathrooms(n) => draft.bathrooms = n,
            Self::Area(area) => draft.area = area,
            Self::RentPrice(price) => draft.rent_price = price,
            Self::SalePrice(price) => draft.sale_price = price,
            Self::Consignation(consignation_type) => draft.consignation_type = consignation_type,
        }
    }
}

/// Image slots are numbered from 1, as printed.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageAction {
    Add,
    Set(usize, String),
    Remove(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (name, rest) = split_word(line);

        let command = match name.to_lowercase().as_str() {
            "city" => Self::City(rest.to_string()),
            "select" => Self::Select(number(rest, "select", "a suggestion number")?),
            "focus" => Self::Focus,
            "dismiss" => Self::Dismiss,
            "search" => Self::Search(rest.to_string()),
            "min" => Self::MinPrice(rest.to_string()),
            "max" => Self::MaxPrice(rest.to_string()),
            "bed" => Self::ToggleBedroom(bedroom(rest)?),
            "type" => Self::Consignation(match rest {
                "" | "any" => None,
                other => Some(consignation(other, "type")?),
            }),
            "per-page" => Self::PerPage(number(rest, "per-page", "a page size")?),
            "next" => Self::Next,
            "prev" => Self::Previous,
            "page" => Self::Page(number(rest, "page", "a page number")?),
            "reset" => Self::Reset,
            "show" | "" => Self::Show,
            "get" => Self::Get(number(rest, "get", "a property id")?),
            "delete" => Self::Delete(number(rest, "delete", "a property id")?),
            "new" => Self::New,
            "edit" => Self::Edit(number(rest, "edit", "a property id")?),
            "set" => Self::Set(rest.parse()?),
            "image" => Self::Image(rest.parse()?),
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

impl FromStr for FieldValue {
    type Err = CommandError;

    fn from_str(args: &str) -> Result<Self, Self::Err> {
        let (field, value) = split_word(args);
        let value = match field.to_lowercase().as_str() {
            "title" => Self::Title(value.to_string()),
            "description" => Self::Description(value.to_string()),
            "address" => Self::Address(value.to_string()),
            "bedrooms" => Self::Bedrooms(number(value, "set bedrooms", "a whole number")?),
            "bathrooms" => Self::Bathrooms(number(value, "set bathrooms", "a whole number")?),
            "area" => Self::Area(number(value, "set area", "a number")?),
            "rent" => Self::RentPrice(optional_price(value, "set rent")?),
            "sale" => Self::SalePrice(optional_price(value, "set sale")?),
            "type" => Self::Consignation(consignation(value, "set type")?),
            _ => {
                return Err(CommandError::BadArgument {
                    command: "set",
                    expected: "a field name, see `help`",
                });
            }
        };
        Ok(value)
    }
}

impl FromStr for ImageAction {
    type Err = CommandError;

    fn from_str(args: &str) -> Result<Self, Self::Err> {
        let (action, rest) = split_word(args);
        let action = match action.to_lowercase().as_str() {
            "add" => Self::Add,
            "set" => {
                let (slot, url) = split_word(rest);
                Self::Set(number(slot, "image set", "a slot number and a url")?, url.to_string())
            }
            "rm" => Self::Remove(number(rest, "image rm", "a slot number")?),
            _ => {
                return Err(CommandError::BadArgument {
                    command: "image",
                    expected: "add, set or rm",
                });
            }
        };
        Ok(action)
    }
}

/// First word and the trimmed remainder.
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    (word, rest.trim())
}

fn number<T: FromStr>(
    raw: &str,
    command: &'static str,
    expected: &'static str,
) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::BadArgument { command, expected })
}

fn bedroom(raw: &str) -> Result<u32, CommandError> {
    let invalid = CommandError::BadArgument {
        command: "bed",
        expected: "a bedroom count from 1 to 5",
    };
    match raw.parse::<u32>() {
        Ok(n) if BEDROOM_OPTIONS.contains(&n) => Ok(n),
        _ => Err(invalid),
    }
}

fn consignation(raw: &str, command: &'static str) -> Result<ConsignationType, CommandError> {
    raw.parse().map_err(|_| CommandError::BadArgument {
        command,
        expected: "rent or sale",
    })
}

fn optional_price(raw: &str, command: &'static str) -> Result<Option<f64>, CommandError> {
    if raw.is_empty() {
        return Ok(None);
    }
    number(raw, command, "a price or nothing").map(Some)
}
