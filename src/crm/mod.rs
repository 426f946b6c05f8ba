// dirttool/src/crm/mod.rs
//
// Client, contact and payment commands. Every field can be supplied through
// the environment (CLIENT_NAME, CONTACT_EMAIL, PAYMENT_AMOUNT, ...); anything
// not set is asked for on the terminal.
use sqlx::PgPool;
use std::str::FromStr;
use tracing::info;

use crate::errors::{AppError, Result};
use crate::models::payment::parse_amount;
use crate::models::Label;
use crate::models::{
    Client, ClientPlan, ClientStatus, ClientSummary, ClientType, Contact, Event, NewClient,
    NewContact, NewPayment, Payment, PaymentFrequency, PaymentType, UpdateClient,
};
use crate::utils::prompt::{ask, get_arg};
use crate::utils::table::print_rows;

fn get_parsed<F, T>(lookup: &F, name: &str, prompt: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr<Err = AppError>,
{
    get_arg(lookup, name, prompt, default)?.parse()
}

fn optional(value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// Finds a client by partial nick or name, asking which one when several match.
pub async fn find_client<F>(pool: &PgPool, lookup: &F) -> Result<Client>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = get_arg(lookup, "CLIENT", "Enter client nickname or id", "")?;
    if let Ok(id) = pattern.trim().parse::<i32>() {
        if let Some(client) = Client::find_by_id(pool, id).await? {
            return Ok(client);
        }
    }
    let mut matches = Client::search(pool, &pattern).await?;

    match matches.len() {
        0 => Err(AppError::NotFound(format!("no client matches '{}'", pattern))),
        1 => Ok(matches.remove(0)),
        n => {
            for (i, client) in matches.iter().enumerate() {
                println!("{}: {} ({} {})", i + 1, client.nick, client.id, client.name);
            }
            let stdin = std::io::stdin();
            let answer = ask(
                &mut stdin.lock(),
                &mut std::io::stdout(),
                &format!("Choose a client (1-{})", n),
                "",
            )?;
            let index = answer
                .parse::<usize>()
                .ok()
                .filter(|i| (1..=n).contains(i))
                .ok_or_else(|| AppError::InvalidInput(format!("'{}' is not between 1 and {}", answer, n)))?;
            Ok(matches.remove(index - 1))
        }
    }
}

/// Inserts a contact unless its email already belongs to one.
pub async fn add_contact(pool: &PgPool, data: NewContact) -> Result<Contact> {
    if let Some(existing) = Contact::find_by_email(pool, &data.email).await? {
        return Err(AppError::InvalidInput(format!(
            "{} is already a contact of client {}",
            existing.email, existing.client_id
        )));
    }
    Contact::create(pool, data).await
}

pub async fn run_client_list(pool: &PgPool) -> Result<()> {
    println!("List clients");
    let rows = ClientSummary::list(pool).await?;
    print_rows(&rows);
    Ok(())
}

pub async fn run_client_show<F>(pool: &PgPool, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    println!("Show client");
    let client = find_client(pool, lookup).await?;
    let contacts = Contact::find_by_client(pool, client.id).await?;
    let payments = Payment::find_by_client(pool, client.id).await?;
    let events = Event::find_by_client(pool, client.id).await?;

    print_rows(std::slice::from_ref(&client));
    print_rows(&contacts);
    print_rows(&payments);
    print_rows(&events);
    Ok(())
}

pub async fn run_client_new<F>(pool: &PgPool, lookup: &F) -> Result<Client>
where
    F: Fn(&str) -> Option<String>,
{
    println!("Add client");
    let new_client = NewClient {
        name: get_arg(lookup, "CLIENT_NAME", "Enter client full name", "")?,
        nick: get_arg(lookup, "CLIENT_NICK", "Enter client Slack nickname", "")?,
        plan: get_parsed::<_, ClientPlan>(lookup, "CLIENT_PLAN", "Enter client plan (free, extra, pro)", "extra")?,
        client_type: get_parsed::<_, ClientType>(lookup, "CLIENT_TYPE", "Enter client type (slack, discord)", "slack")?,
        notes: get_arg(lookup, "CLIENT_NOTES", "Enter notes", "")?,
        url: optional(get_arg(lookup, "CLIENT_URL", "Enter client's website URL", "")?),
        team: optional(get_arg(lookup, "CLIENT_TEAM", "Enter client's Slack Team ID", "")?),
    };
    if new_client.name.trim().is_empty() {
        return Err(AppError::InvalidInput("client name cannot be empty".into()));
    }

    let client = Client::create(pool, new_client).await?;
    info!(client_id = client.id, nick = %client.nick, "client created");
    print_rows(std::slice::from_ref(&client));

    let name = get_arg(lookup, "CONTACT_NAME", "Enter contact full name", "")?;
    let email = get_arg(lookup, "CONTACT_EMAIL", "Enter contact email address", "")?;
    if name.trim().is_empty() && email.trim().is_empty() {
        println!("No contact given, skipping.");
        return Ok(client);
    }
    let role = get_arg(lookup, "CONTACT_ROLE", "Enter contact role (payer or blank)", "")?;
    let contact = add_contact(
        pool,
        NewContact {
            client_id: client.id,
            name,
            email,
            role,
        },
    )
    .await?;
    print_rows(&[contact]);

    Ok(client)
}

pub async fn run_client_edit<F>(pool: &PgPool, lookup: &F) -> Result<Client>
where
    F: Fn(&str) -> Option<String>,
{
    println!("Edit client");
    let client = find_client(pool, lookup).await?;
    print_rows(std::slice::from_ref(&client));

    let plan: ClientPlan = get_parsed(lookup, "CLIENT_PLAN", "Enter client plan", client.plan.as_str())?;
    let update = UpdateClient {
        name: Some(get_arg(lookup, "CLIENT_NAME", "Enter client name", &client.name)?),
        nick: Some(get_arg(lookup, "CLIENT_NICK", "Enter client nick", &client.nick)?),
        client_type: Some(get_parsed::<_, ClientType>(lookup, "CLIENT_TYPE", "Enter client type", client.client_type.as_str())?),
        plan: Some(plan),
        status: Some(get_parsed::<_, ClientStatus>(lookup, "CLIENT_STATUS", "Enter client status", client.status.as_str())?),
        notes: Some(get_arg(lookup, "CLIENT_NOTES", "Enter client notes", &client.notes)?),
        url: optional(get_arg(lookup, "CLIENT_URL", "Enter client url", client.url.as_deref().unwrap_or(""))?),
        team: optional(get_arg(lookup, "CLIENT_TEAM", "Enter client team", client.team.as_deref().unwrap_or(""))?),
    };

    let updated = Client::update(pool, client.id, update).await?;
    if updated.plan != client.plan {
        info!(client_id = client.id, from = %client.plan, to = %updated.plan, "plan changed");
    }

    println!("Refetched client:");
    print_rows(std::slice::from_ref(&updated));
    Ok(updated)
}

pub async fn run_contact_new<F>(pool: &PgPool, lookup: &F) -> Result<Contact>
where
    F: Fn(&str) -> Option<String>,
{
    println!("Add contact");
    let client = find_client(pool, lookup).await?;
    print_rows(std::slice::from_ref(&client));

    let contact = add_contact(
        pool,
        NewContact {
            client_id: client.id,
            name: get_arg(lookup, "CONTACT_NAME", "Enter contact name", "")?,
            email: get_arg(lookup, "CONTACT_EMAIL", "Enter contact email", "")?,
            role: get_arg(lookup, "CONTACT_ROLE", "Enter contact role", "")?,
        },
    )
    .await?;

    println!("New contact:");
    print_rows(std::slice::from_ref(&contact));
    Ok(contact)
}

/// Adds a payment. When the client has paid before, the last payment's terms
/// are offered as defaults.
pub async fn run_payment_new<F>(pool: &PgPool, lookup: &F) -> Result<Payment>
where
    F: Fn(&str) -> Option<String>,
{
    println!("Add payment");
    let client = find_client(pool, lookup).await?;
    print_rows(std::slice::from_ref(&client));
    print_rows(&Payment::find_by_client(pool, client.id).await?);

    let defaults = Payment::latest_for_client(pool, client.id)
        .await?
        .map(|previous| NewPayment::repeat_of(&previous));

    let default_amount = defaults.as_ref().map(|d| d.amount.to_string()).unwrap_or_default();
    let default_frequency = defaults.as_ref().map(|d| d.frequency.to_string()).unwrap_or_default();
    let default_plan = defaults.as_ref().map(|d| d.plan.clone()).unwrap_or_default();
    let default_type = defaults.as_ref().map(|d| d.payment_type.to_string()).unwrap_or_default();

    let payment = NewPayment {
        client_id: client.id,
        amount: parse_amount(&get_arg(lookup, "PAYMENT_AMOUNT", "Enter payment amount", &default_amount)?)?,
        frequency: get_parsed::<_, PaymentFrequency>(lookup, "PAYMENT_FREQ", "Enter payment frequency (monthly, yearly)", &default_frequency)?,
        plan: get_arg(lookup, "PAYMENT_PLAN", "Enter payment plan (extra_9, pro_49)", &default_plan)?,
        payment_type: get_parsed::<_, PaymentType>(lookup, "PAYMENT_TYPE", "Enter payment type (stripe, paypal, bmac)", &default_type)?,
    };

    let payment = Payment::create(pool, payment).await?;
    info!(client_id = client.id, payment_id = payment.id, amount = %payment.amount, "payment recorded");
    println!("New payment:");
    print_rows(std::slice::from_ref(&payment));
    Ok(payment)
}
