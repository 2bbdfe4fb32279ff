//! The static tool table.
//!
//! Each entry binds a tool name to its input fields and to the single Perfex
//! REST route it calls. This table is the only place tools are added.

use std::collections::HashMap;

use serde::Serialize;

use crate::schema::{input_schema, FieldSpec, FieldType, JsonObject};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    pub fn sends_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the pipeline requires of the response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    List,
    Record,
    Mutation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    /// Path relative to the API base URL; `{field}` placeholders are filled
    /// from validated arguments.
    pub path: &'static str,
    pub shape: ResponseShape,
    /// Human label used in default messages and error text, e.g. `create lead`.
    pub action: &'static str,
}

impl Route {
    /// Names of the `{placeholder}` segments in `path`, in order.
    pub fn path_params(&self) -> Vec<&'static str> {
        let mut params = Vec::new();
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    params.push(&after[..end]);
                    rest = &after[end + 1..];
                }
                None => break,
            }
        }
        params
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
    pub route: Route,
}

impl ToolDescriptor {
    pub fn input_schema(&self) -> JsonObject {
        input_schema(self.fields)
    }
}

/// Immutable name index over [`TOOLS`].
#[derive(Debug)]
pub struct Catalog {
    tools: &'static [ToolDescriptor],
    index: HashMap<&'static str, usize>,
}

impl Catalog {
    pub fn new(tools: &'static [ToolDescriptor]) -> Self {
        let index =
            tools.iter().enumerate().map(|(position, tool)| (tool.name, position)).collect();
        Self { tools, index }
    }

    pub fn standard() -> Self {
        Self::new(TOOLS)
    }

    pub fn get(&self, name: &str) -> Option<&'static ToolDescriptor> {
        let tools = self.tools;
        self.index.get(name).map(|position| &tools[*position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

const fn route(
    method: HttpMethod,
    path: &'static str,
    shape: ResponseShape,
    action: &'static str,
) -> Route {
    Route { method, path, shape, action }
}

const fn tool(
    name: &'static str,
    description: &'static str,
    fields: &'static [FieldSpec],
    route: Route,
) -> ToolDescriptor {
    ToolDescriptor { name, description, fields, route }
}

use FieldType::{Id, Integer, IntegerOrString, Number};
use HttpMethod::{Delete, Get, Post, Put};
use ResponseShape::{List, Mutation, Record};

const NO_FIELDS: &[FieldSpec] = &[];

const fn id(description: &'static str) -> FieldSpec {
    FieldSpec::required("id", Id, description)
}

const fn keysearch(description: &'static str) -> FieldSpec {
    FieldSpec::required("keysearch", FieldType::String, description)
}

const fn text(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::optional(name, FieldType::String, description)
}

const fn int(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::optional(name, Integer, description)
}

const fn num(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::optional(name, Number, description)
}

const fn must_text(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::required(name, FieldType::String, description)
}

const fn must_int(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::required(name, Integer, description)
}

// customers

const SEARCH_CUSTOMERS: &[FieldSpec] = &[keysearch("Search term to find customers")];
const CUSTOMER_ID: &[FieldSpec] = &[id("Customer unique ID")];
const CREATE_CUSTOMER: &[FieldSpec] = &[
    must_text("company", "Company name (required)").non_empty(),
    text("vat", "VAT/Tax ID number"),
    text("phonenumber", "Phone number"),
    text("website", "Website URL"),
    text("address", "Address"),
    text("city", "City"),
    text("state", "State/Province"),
    text("zip", "ZIP/Postal code"),
    int("country", "Country ID"),
];

// invoices

const INVOICE_ID: &[FieldSpec] = &[id("Invoice unique ID")];
const SEARCH_INVOICES: &[FieldSpec] = &[keysearch("Search term to find invoices")];

// tasks

const TASK_ID: &[FieldSpec] = &[id("Task unique ID")];
const SEARCH_TASKS: &[FieldSpec] = &[keysearch("Search term to find tasks")];

// leads

const LEAD_ID: &[FieldSpec] = &[id("Lead unique ID")];
const DELETE_LEAD: &[FieldSpec] = &[id("Lead unique ID to delete")];
const SEARCH_LEADS: &[FieldSpec] = &[keysearch("Search term to find leads")];
const CREATE_LEAD: &[FieldSpec] = &[
    must_text("name", "Lead name (required)").non_empty(),
    FieldSpec::required("source", IntegerOrString, "Lead source ID (required)"),
    FieldSpec::required("status", IntegerOrString, "Lead status ID (required)"),
    FieldSpec::required("assigned", IntegerOrString, "Assigned staff ID (required)"),
    text("email", "Email address"),
    text("phonenumber", "Phone number"),
    text("company", "Company name"),
];
const UPDATE_LEAD: &[FieldSpec] = &[
    id("Lead unique ID (required)"),
    text("name", "Lead name"),
    FieldSpec::optional("source", IntegerOrString, "Lead source ID"),
    FieldSpec::optional("status", IntegerOrString, "Lead status ID"),
    FieldSpec::optional("assigned", IntegerOrString, "Assigned staff ID"),
    text("email", "Email address"),
    text("phonenumber", "Phone number"),
    text("company", "Company name"),
];

// proposals

const PROPOSAL_ID: &[FieldSpec] = &[id("Proposal unique ID")];
const DELETE_PROPOSAL: &[FieldSpec] = &[id("Proposal unique ID to delete")];
const SEARCH_PROPOSALS: &[FieldSpec] = &[keysearch("Search term to find proposals")];
const CREATE_PROPOSAL: &[FieldSpec] = &[
    must_text("subject", "Proposal subject (required)").non_empty(),
    must_text("rel_type", "Related type: lead, customer (required)"),
    must_int("rel_id", "Related ID (Lead or Customer ID) (required)"),
    must_text("date", "Proposal date (YYYY-MM-DD) (required)"),
    must_int("currency", "Currency ID (required)"),
    int("assigned", "Assigned staff ID"),
    text("content", "Proposal content (HTML)"),
];
const UPDATE_PROPOSAL: &[FieldSpec] = &[
    id("Proposal unique ID (required)"),
    text("subject", "Proposal subject"),
    text("rel_type", "Related type: lead, customer"),
    int("rel_id", "Related ID (Lead or Customer ID)"),
    text("date", "Proposal date (YYYY-MM-DD)"),
    int("currency", "Currency ID"),
    int("assigned", "Assigned staff ID"),
    text("content", "Proposal content (HTML)"),
];

// estimates

const ESTIMATE_ID: &[FieldSpec] = &[id("Estimate unique ID")];
const DELETE_ESTIMATE: &[FieldSpec] = &[id("Estimate unique ID to delete")];
const SEARCH_ESTIMATES: &[FieldSpec] = &[keysearch("Search term to find estimates")];
const CREATE_ESTIMATE: &[FieldSpec] = &[
    must_int("clientid", "Customer ID (required)"),
    must_int("number", "Estimate number (required)"),
    must_text("date", "Estimate date (YYYY-MM-DD) (required)"),
    must_int("currency", "Currency ID (required)"),
    text("expirydate", "Expiry date (YYYY-MM-DD)"),
    int("status", "Estimate status ID"),
    int("sale_agent", "Sale agent staff ID"),
    text("clientnote", "Note visible to the customer"),
    text("adminnote", "Internal admin note"),
    text("terms", "Terms and conditions"),
];
const UPDATE_ESTIMATE: &[FieldSpec] = &[
    id("Estimate unique ID (required)"),
    int("clientid", "Customer ID"),
    int("number", "Estimate number"),
    text("date", "Estimate date (YYYY-MM-DD)"),
    int("currency", "Currency ID"),
    text("expirydate", "Expiry date (YYYY-MM-DD)"),
    int("status", "Estimate status ID"),
    int("sale_agent", "Sale agent staff ID"),
    text("clientnote", "Note visible to the customer"),
    text("adminnote", "Internal admin note"),
    text("terms", "Terms and conditions"),
];

// calendar events

const EVENT_ID: &[FieldSpec] = &[id("Calendar event unique ID")];
const DELETE_EVENT: &[FieldSpec] = &[id("Calendar event unique ID to delete")];
const CREATE_EVENT: &[FieldSpec] = &[
    must_text("title", "Event title (required)").non_empty(),
    must_text("start", "Start date-time (YYYY-MM-DD HH:MM:SS) (required)"),
    must_int("userid", "Owner staff ID (required)"),
    text("end", "End date-time (YYYY-MM-DD HH:MM:SS)"),
    text("description", "Event description"),
    text("color", "Display color (hex)"),
    int("reminder_before", "Reminder lead time"),
    text("reminder_before_type", "Reminder unit: minutes, hours, days, weeks"),
    int("public", "1 to share the event with all staff"),
];
const UPDATE_EVENT: &[FieldSpec] = &[
    id("Calendar event unique ID (required)"),
    text("title", "Event title"),
    text("start", "Start date-time (YYYY-MM-DD HH:MM:SS)"),
    int("userid", "Owner staff ID"),
    text("end", "End date-time (YYYY-MM-DD HH:MM:SS)"),
    text("description", "Event description"),
    text("color", "Display color (hex)"),
    int("reminder_before", "Reminder lead time"),
    text("reminder_before_type", "Reminder unit: minutes, hours, days, weeks"),
    int("public", "1 to share the event with all staff"),
];

// contacts

const CONTACT_ID: &[FieldSpec] = &[id("Contact unique ID")];
const DELETE_CONTACT: &[FieldSpec] = &[id("Contact unique ID to delete")];
const SEARCH_CONTACTS: &[FieldSpec] = &[keysearch("Search term to find contacts")];
const CREATE_CONTACT: &[FieldSpec] = &[
    must_int("customer_id", "Customer ID the contact belongs to (required)"),
    must_text("firstname", "First name (required)").non_empty(),
    must_text("lastname", "Last name (required)").non_empty(),
    must_text("email", "Email address (required)").non_empty(),
    text("title", "Position/title"),
    text("phonenumber", "Phone number"),
    text("password", "Portal password"),
    int("is_primary", "1 to make this the primary contact"),
];
const UPDATE_CONTACT: &[FieldSpec] = &[
    id("Contact unique ID (required)"),
    text("firstname", "First name"),
    text("lastname", "Last name"),
    text("email", "Email address"),
    text("title", "Position/title"),
    text("phonenumber", "Phone number"),
    text("password", "Portal password"),
    int("is_primary", "1 to make this the primary contact"),
];

// projects

const PROJECT_ID: &[FieldSpec] = &[id("Project unique ID")];
const DELETE_PROJECT: &[FieldSpec] = &[id("Project unique ID to delete")];
const SEARCH_PROJECTS: &[FieldSpec] = &[keysearch("Search term to find projects")];
const CREATE_PROJECT: &[FieldSpec] = &[
    must_text("name", "Project name (required)").non_empty(),
    must_int("clientid", "Customer ID (required)"),
    must_int(
        "billing_type",
        "Billing type: 1 fixed rate, 2 project hours, 3 task hours (required)",
    ),
    must_text("start_date", "Start date (YYYY-MM-DD) (required)"),
    must_int("status", "Project status ID (required)"),
    text("deadline", "Deadline (YYYY-MM-DD)"),
    num("project_cost", "Total cost for fixed rate billing"),
    num("project_rate_per_hour", "Hourly rate for project hours billing"),
    num("estimated_hours", "Estimated hours"),
    text("description", "Project description"),
];
const UPDATE_PROJECT: &[FieldSpec] = &[
    id("Project unique ID (required)"),
    text("name", "Project name"),
    int("clientid", "Customer ID"),
    int("billing_type", "Billing type: 1 fixed rate, 2 project hours, 3 task hours"),
    text("start_date", "Start date (YYYY-MM-DD)"),
    int("status", "Project status ID"),
    text("deadline", "Deadline (YYYY-MM-DD)"),
    num("project_cost", "Total cost for fixed rate billing"),
    num("project_rate_per_hour", "Hourly rate for project hours billing"),
    num("estimated_hours", "Estimated hours"),
    text("description", "Project description"),
];

// expenses

const EXPENSE_ID: &[FieldSpec] = &[id("Expense unique ID")];
const DELETE_EXPENSE: &[FieldSpec] = &[id("Expense unique ID to delete")];
const SEARCH_EXPENSES: &[FieldSpec] = &[keysearch("Search term to find expenses")];
const CREATE_EXPENSE: &[FieldSpec] = &[
    must_int("category", "Expense category ID (required)"),
    FieldSpec::required("amount", Number, "Amount (required)"),
    must_text("date", "Expense date (YYYY-MM-DD) (required)"),
    must_int("currency", "Currency ID (required)"),
    text("expense_name", "Expense name"),
    text("note", "Note"),
    int("clientid", "Customer ID to bill"),
    int("project_id", "Related project ID"),
    int("paymentmode", "Payment mode ID"),
    int("tax", "Tax ID"),
    text("reference_no", "Reference number"),
];
const UPDATE_EXPENSE: &[FieldSpec] = &[
    id("Expense unique ID (required)"),
    int("category", "Expense category ID"),
    num("amount", "Amount"),
    text("date", "Expense date (YYYY-MM-DD)"),
    int("currency", "Currency ID"),
    text("expense_name", "Expense name"),
    text("note", "Note"),
    int("clientid", "Customer ID to bill"),
    int("project_id", "Related project ID"),
    int("paymentmode", "Payment mode ID"),
    int("tax", "Tax ID"),
    text("reference_no", "Reference number"),
];

pub static TOOLS: &[ToolDescriptor] = &[
    // customers
    tool(
        "search_customers",
        "Search for customers in Perfex CRM",
        SEARCH_CUSTOMERS,
        route(Get, "/customers/search/{keysearch}", List, "search customers"),
    ),
    tool(
        "list_customers",
        "List all customers",
        NO_FIELDS,
        route(Get, "/customers", List, "list customers"),
    ),
    tool(
        "get_customer_by_id",
        "Get detailed information about a specific customer",
        CUSTOMER_ID,
        route(Get, "/customers/{id}", Record, "get customer"),
    ),
    tool(
        "create_customer",
        "Create a new customer",
        CREATE_CUSTOMER,
        route(Post, "/customers", Mutation, "create customer"),
    ),
    // invoices
    tool(
        "list_invoices",
        "List all invoices",
        NO_FIELDS,
        route(Get, "/invoices", List, "list invoices"),
    ),
    tool(
        "get_invoice_by_id",
        "Get detailed information about a specific invoice",
        INVOICE_ID,
        route(Get, "/invoices/{id}", Record, "get invoice"),
    ),
    tool(
        "search_invoices",
        "Search for invoices by keyword",
        SEARCH_INVOICES,
        route(Get, "/invoices/search/{keysearch}", List, "search invoices"),
    ),
    // tasks
    tool(
        "get_task_by_id",
        "Get detailed information about a specific task",
        TASK_ID,
        route(Get, "/tasks/{id}", Record, "get task"),
    ),
    tool(
        "search_tasks",
        "Search for tasks by keyword",
        SEARCH_TASKS,
        route(Get, "/tasks/search/{keysearch}", List, "search tasks"),
    ),
    // leads
    tool("list_leads", "List all leads", NO_FIELDS, route(Get, "/leads", List, "list leads")),
    tool(
        "create_lead",
        "Create a new lead",
        CREATE_LEAD,
        route(Post, "/leads", Mutation, "create lead"),
    ),
    tool(
        "get_lead_by_id",
        "Get detailed information about a specific lead",
        LEAD_ID,
        route(Get, "/leads/{id}", Record, "get lead"),
    ),
    tool(
        "update_lead",
        "Update an existing lead",
        UPDATE_LEAD,
        route(Put, "/leads/{id}", Mutation, "update lead"),
    ),
    tool(
        "search_leads",
        "Search for leads by keyword",
        SEARCH_LEADS,
        route(Get, "/leads/search/{keysearch}", List, "search leads"),
    ),
    tool(
        "delete_lead",
        "Delete a lead permanently",
        DELETE_LEAD,
        route(Delete, "/delete/leads/{id}", Mutation, "delete lead"),
    ),
    // proposals
    tool(
        "list_proposals",
        "List all proposals",
        NO_FIELDS,
        route(Get, "/proposals", List, "list proposals"),
    ),
    tool(
        "create_proposal",
        "Create a new proposal",
        CREATE_PROPOSAL,
        route(Post, "/proposals", Mutation, "create proposal"),
    ),
    tool(
        "get_proposal_by_id",
        "Get detailed information about a specific proposal",
        PROPOSAL_ID,
        route(Get, "/proposals/{id}", Record, "get proposal"),
    ),
    tool(
        "update_proposal",
        "Update an existing proposal",
        UPDATE_PROPOSAL,
        route(Put, "/proposals/{id}", Mutation, "update proposal"),
    ),
    tool(
        "search_proposals",
        "Search for proposals by keyword",
        SEARCH_PROPOSALS,
        route(Get, "/proposals/search/{keysearch}", List, "search proposals"),
    ),
    tool(
        "delete_proposal",
        "Delete a proposal permanently",
        DELETE_PROPOSAL,
        route(Delete, "/proposals/{id}", Mutation, "delete proposal"),
    ),
    // estimates
    tool(
        "list_estimates",
        "List all estimates",
        NO_FIELDS,
        route(Get, "/estimates", List, "list estimates"),
    ),
    tool(
        "get_estimate_by_id",
        "Get detailed information about a specific estimate",
        ESTIMATE_ID,
        route(Get, "/estimates/{id}", Record, "get estimate"),
    ),
    tool(
        "search_estimates",
        "Search for estimates by keyword",
        SEARCH_ESTIMATES,
        route(Get, "/estimates/search/{keysearch}", List, "search estimates"),
    ),
    tool(
        "create_estimate",
        "Create a new estimate",
        CREATE_ESTIMATE,
        route(Post, "/estimates", Mutation, "create estimate"),
    ),
    tool(
        "update_estimate",
        "Update an existing estimate",
        UPDATE_ESTIMATE,
        route(Put, "/estimates/{id}", Mutation, "update estimate"),
    ),
    tool(
        "delete_estimate",
        "Delete an estimate permanently",
        DELETE_ESTIMATE,
        route(Delete, "/estimates/{id}", Mutation, "delete estimate"),
    ),
    // calendar events
    tool(
        "list_calendar_events",
        "List all calendar events",
        NO_FIELDS,
        route(Get, "/calendar", List, "list calendar events"),
    ),
    tool(
        "get_calendar_event_by_id",
        "Get detailed information about a specific calendar event",
        EVENT_ID,
        route(Get, "/calendar/{id}", Record, "get calendar event"),
    ),
    tool(
        "create_calendar_event",
        "Create a new calendar event",
        CREATE_EVENT,
        route(Post, "/calendar", Mutation, "create calendar event"),
    ),
    tool(
        "update_calendar_event",
        "Update an existing calendar event",
        UPDATE_EVENT,
        route(Put, "/calendar/{id}", Mutation, "update calendar event"),
    ),
    tool(
        "delete_calendar_event",
        "Delete a calendar event permanently",
        DELETE_EVENT,
        route(Delete, "/calendar/{id}", Mutation, "delete calendar event"),
    ),
    // contacts
    tool(
        "search_contacts",
        "Search for customer contacts by keyword",
        SEARCH_CONTACTS,
        route(Get, "/contacts/search/{keysearch}", List, "search contacts"),
    ),
    tool(
        "get_contact_by_id",
        "Get detailed information about a specific contact",
        CONTACT_ID,
        route(Get, "/contacts/{id}", Record, "get contact"),
    ),
    tool(
        "create_contact",
        "Create a new contact for a customer",
        CREATE_CONTACT,
        route(Post, "/contacts", Mutation, "create contact"),
    ),
    tool(
        "update_contact",
        "Update an existing contact",
        UPDATE_CONTACT,
        route(Put, "/contacts/{id}", Mutation, "update contact"),
    ),
    tool(
        "delete_contact",
        "Delete a contact permanently",
        DELETE_CONTACT,
        route(Delete, "/contacts/{id}", Mutation, "delete contact"),
    ),
    // projects
    tool(
        "list_projects",
        "List all projects",
        NO_FIELDS,
        route(Get, "/projects", List, "list projects"),
    ),
    tool(
        "get_project_by_id",
        "Get detailed information about a specific project",
        PROJECT_ID,
        route(Get, "/projects/{id}", Record, "get project"),
    ),
    tool(
        "search_projects",
        "Search for projects by keyword",
        SEARCH_PROJECTS,
        route(Get, "/projects/search/{keysearch}", List, "search projects"),
    ),
    tool(
        "create_project",
        "Create a new project",
        CREATE_PROJECT,
        route(Post, "/projects", Mutation, "create project"),
    ),
    tool(
        "update_project",
        "Update an existing project",
        UPDATE_PROJECT,
        route(Put, "/projects/{id}", Mutation, "update project"),
    ),
    tool(
        "delete_project",
        "Delete a project permanently",
        DELETE_PROJECT,
        route(Delete, "/projects/{id}", Mutation, "delete project"),
    ),
    // expenses
    tool(
        "list_expenses",
        "List all expenses",
        NO_FIELDS,
        route(Get, "/expenses", List, "list expenses"),
    ),
    tool(
        "get_expense_by_id",
        "Get detailed information about a specific expense",
        EXPENSE_ID,
        route(Get, "/expenses/{id}", Record, "get expense"),
    ),
    tool(
        "search_expenses",
        "Search for expenses by keyword",
        SEARCH_EXPENSES,
        route(Get, "/expenses/search/{keysearch}", List, "search expenses"),
    ),
    tool(
        "create_expense",
        "Create a new expense",
        CREATE_EXPENSE,
        route(Post, "/expenses", Mutation, "create expense"),
    ),
    tool(
        "update_expense",
        "Update an existing expense",
        UPDATE_EXPENSE,
        route(Put, "/expenses/{id}", Mutation, "update expense"),
    ),
    tool(
        "delete_expense",
        "Delete an expense permanently",
        DELETE_EXPENSE,
        route(Delete, "/expenses/{id}", Mutation, "delete expense"),
    ),
    // lookups
    tool(
        "list_payment_modes",
        "List all payment modes",
        NO_FIELDS,
        route(Get, "/common/payment_mode", List, "list payment modes"),
    ),
    tool(
        "list_expense_categories",
        "List all expense categories",
        NO_FIELDS,
        route(Get, "/common/expense_category", List, "list expense categories"),
    ),
    tool(
        "list_taxes",
        "List all taxes",
        NO_FIELDS,
        route(Get, "/common/tax_data", List, "list taxes"),
    ),
];
