//! Command table and handlers for the wizard shell.

use uuid::Uuid;

use crate::cli::core::{short_id, Backend, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::proximity::ProximityInputConfig;
use crate::core::steps::{effective_steps, shows_flatmate_requirements, WizardStep};
use crate::core::submission::SubmissionOutcome;
use crate::domain::{
    Displayable, DistanceUnit, ListingGoal, ListingId, PoiCategory, PropertyType, TEXT_FIELDS,
};
use crate::storage::JsonListingStore;
use crate::utils::build_info;

pub(crate) type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone, Copy)]
pub(crate) struct CommandEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
    pub handler: CommandHandler,
}

const fn entry(
    name: &'static str,
    aliases: &'static [&'static str],
    usage: &'static str,
    description: &'static str,
    handler: CommandHandler,
) -> CommandEntry {
    CommandEntry {
        name,
        aliases,
        usage,
        description,
        handler,
    }
}

pub(crate) fn registry() -> Vec<CommandEntry> {
    vec![
        entry("new", &[], "new", "Discard the current form and start a new listing", cmd_new),
        entry("edit", &[], "edit <listing-id>", "Load a stored listing for editing", cmd_edit),
        entry("listings", &[], "listings", "Show stored listing ids", cmd_listings),
        entry("goal", &[], "goal <rent|sale|flatmate>", "Choose what the listing offers", cmd_goal),
        entry("type", &[], "type <property-type>", "Choose the property type", cmd_type),
        entry(
            "set",
            &[],
            "set <field> <value>",
            "Set a form field (empty value clears it)",
            cmd_set,
        ),
        entry("amenity", &[], "amenity <add|rm> <name>", "Add or remove an amenity", cmd_amenity),
        entry(
            "unit",
            &[],
            "unit <km|meter|min walk>",
            "Distance unit for proximity points",
            cmd_unit,
        ),
        entry(
            "poi",
            &[],
            "poi <add <category> <type> <distance> [name]|rm <id>|list>",
            "Manage nearby points of interest",
            cmd_poi,
        ),
        entry("image", &[], "image <add <url>|rm <url>|list>", "Manage listing images", cmd_image),
        entry("next", &["n"], "next", "Validate this step and move on", cmd_next),
        entry("back", &["b"], "back", "Return to the previous step", cmd_back),
        entry("goto", &[], "goto <step-number>", "Jump to a visited step", cmd_goto),
        entry("steps", &[], "steps", "Show every step and its state", cmd_steps),
        entry("show", &[], "show", "Print the values entered so far", cmd_show),
        entry("submit", &[], "submit", "Send the listing from the final step", cmd_submit),
        entry("version", &[], "version", "Print build information", cmd_version),
        entry("help", &["?"], "help [command]", "List commands or explain one", cmd_help),
        entry("exit", &["quit", "q"], "exit", "Leave the wizard", cmd_exit),
    ]
}

fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("Usage: {usage}"))
}

fn cmd_new(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.start_over();
    output::success("Started a new listing.");
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage_error("edit <listing-id>"));
    };
    let id = ListingId::parse(raw)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{raw}` is not a listing id")))?;
    let fresh = ShellContext::fresh_session(&context.config);
    let service = context.service.clone();
    let session = context
        .runtime
        .block_on(fresh.open_for_edit(service.as_ref(), id))?;
    context.session.teardown();
    context.session = session;
    output::success(format!("Editing listing {id}."));
    Ok(())
}

fn cmd_listings(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Backend::Json(base) = &context.backend else {
        output::info("Listings are kept in memory for this run.");
        return Ok(());
    };
    let ids = JsonListingStore::in_base_dir(base)
        .and_then(|store| store.list_ids())
        .map_err(|err| CommandError::Wizard(err.into()))?;
    if ids.is_empty() {
        output::info("No stored listings.");
    }
    for id in ids {
        output::detail(id);
    }
    Ok(())
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage_error("goal <rent|sale|flatmate>"));
    };
    let goal = ListingGoal::parse(raw)
        .ok_or_else(|| CommandError::InvalidArguments(format!("Unknown goal `{raw}`")))?;
    context.session.set_goal(goal)?;
    let allowed: Vec<String> = goal
        .allowed_property_types()
        .iter()
        .map(PropertyType::to_string)
        .collect();
    output::info(format!("Goal set to {goal}. Property types: {}", allowed.join(", ")));
    Ok(())
}

fn cmd_type(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage_error("type <property-type>"));
    }
    context.session.set_field("property_type", &args.join(" "))?;
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((key, rest)) = args.split_first() else {
        return Err(usage_error("set <field> <value>"));
    };
    let key = key.to_ascii_lowercase().replace('-', "_");
    context.session.set_field(&key, &rest.join(" "))?;
    Ok(())
}

fn cmd_amenity(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage_error("amenity <add|rm> <name>"));
    };
    let name = rest.join(" ");
    match *action {
        "add" => {
            if !context.session.add_amenity(&name)? {
                output::info(format!("`{name}` is already listed."));
            }
        }
        "rm" | "remove" => {
            if !context.session.remove_amenity(&name)? {
                output::warning(format!("`{name}` is not listed."));
            }
        }
        _ => return Err(usage_error("amenity <add|rm> <name>")),
    }
    Ok(())
}

fn cmd_unit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args.join(" ");
    let unit = DistanceUnit::parse(&raw)
        .ok_or_else(|| usage_error("unit <km|meter|min walk>"))?;
    context.session.set_distance_unit(unit)?;
    output::info(format!("Distances are now entered in {unit}."));
    Ok(())
}

fn cmd_poi(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    const USAGE: &str = "poi <add <category> <type> <distance> [name]|rm <id>|list>";
    match args {
        ["add", category, poi_type, distance, name @ ..] => {
            let category = PoiCategory::parse(category).ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "Unknown category `{category}` (transit, essential, utility)"
                ))
            })?;
            let name = name.join(" ");
            let name = (!name.is_empty()).then_some(name.as_str());
            let id = context.session.add_point(category, poi_type, name, distance)?;
            output::success(format!("Added {category} point {}.", short_id(&id.to_string())));
            Ok(())
        }
        ["rm", raw] => {
            let id = find_point(context, raw)?;
            context.session.remove_point(id)?;
            output::info("Point removed.");
            Ok(())
        }
        ["list"] | [] => {
            list_points(context);
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}

/// Resolves a full id or a unique prefix of one.
fn find_point(context: &ShellContext, raw: &str) -> Result<Uuid, CommandError> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }
    let proximity = &context.session.state().proximity;
    let matches: Vec<Uuid> = PoiCategory::ALL
        .into_iter()
        .flat_map(|category| proximity.list_by_category(category))
        .map(|record| record.id)
        .filter(|id| id.to_string().starts_with(raw))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::InvalidArguments(format!("No point matches `{raw}`"))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{raw}` matches more than one point"
        ))),
    }
}

fn list_points(context: &ShellContext) {
    let proximity = &context.session.state().proximity;
    output::info(format!("Distance unit: {}", proximity.unit()));
    for category in PoiCategory::ALL {
        let config = ProximityInputConfig::for_category(category);
        output::section(config.title);
        let records = proximity.list_by_category(category);
        if records.is_empty() {
            output::detail("(none)");
        }
        for record in records {
            output::detail(format!(
                "{}  {}",
                short_id(&record.id.to_string()),
                record.display_label()
            ));
        }
    }
}

fn cmd_image(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        ["add", url] => {
            context.runtime.block_on(context.session.submit_image(url))?;
            let images = &context.session.state().images;
            output::success(format!(
                "Image added ({}/{}).",
                images.images().len(),
                images.max_images()
            ));
            Ok(())
        }
        ["rm", url] => {
            if !context.session.remove_image(url)? {
                output::warning(format!("`{url}` is not in the list."));
            }
            Ok(())
        }
        ["list"] | [] => {
            let images = &context.session.state().images;
            output::info(format!(
                "{} of at least {} images validated.",
                images.validated_count(),
                images.min_images()
            ));
            for (index, image) in images.images().iter().enumerate() {
                let marker = if image.validated { "ok" } else { "pending" };
                output::detail(format!("{}. {} [{marker}]", index + 1, image.url));
            }
            Ok(())
        }
        _ => Err(usage_error("image <add <url>|rm <url>|list>")),
    }
}

fn cmd_next(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let before = context.session.current_step();
    let after = context.session.advance()?;
    if before == after {
        output::success(format!("{after} is complete. Use `submit` to send the listing."));
    } else {
        output::info(format!("Now on {after}."));
    }
    Ok(())
}

fn cmd_back(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.session.go_back() {
        Some(step) => output::info(format!("Now on {step}.")),
        None => output::warning("Already on the first step."),
    }
    Ok(())
}

fn cmd_goto(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage_error("goto <step-number>"));
    };
    let step_id: u8 = raw
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a step number")))?;
    let step = context.session.go_to(step_id)?;
    output::info(format!("Now on {step}."));
    Ok(())
}

fn cmd_steps(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = &context.session;
    output::section("Steps");
    for step in effective_steps(session.state()) {
        let marker = if step == session.current_step() {
            ">"
        } else if session.sequencer().is_completed(step) {
            "x"
        } else {
            " "
        };
        output::detail(format!("[{marker}] {step}"));
    }
    Ok(())
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = &context.session;
    let fields = session.fields();
    output::section(format!("Listing ({})", session.current_step().label()));
    let goal = fields.goal().map(|goal| goal.to_string()).unwrap_or_default();
    let property_type = fields
        .property_type
        .map(|value| value.to_string())
        .unwrap_or_default();
    output::detail(format!("goal: {goal}"));
    output::detail(format!("property_type: {property_type}"));
    let price_key = fields.goal().map(ListingGoal::price_field).unwrap_or("rent");
    for (key, label) in TEXT_FIELDS {
        let flatmate_only = matches!(*key, "preferred_gender" | "preferred_occupation");
        if flatmate_only && !shows_flatmate_requirements(session.state()) {
            continue;
        }
        let Some(value) = fields.text(key) else { continue };
        if value.is_empty() {
            continue;
        }
        let key: &str = if *key == "price" { price_key } else { key };
        output::detail(format!("{key} ({label}): {value}"));
    }
    if let Some(furnishing) = fields.furnishing {
        output::detail(format!("furnishing: {furnishing}"));
    }
    if let Some(ownership) = fields.ownership {
        output::detail(format!("ownership: {ownership}"));
    }
    if !fields.amenities.is_empty() {
        output::detail(format!("amenities: {}", fields.amenities.join(", ")));
    }
    output::detail(format!(
        "points: {}, images: {}",
        session.state().proximity.len(),
        session.state().images.images().len()
    ));
    Ok(())
}

fn cmd_submit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let service = context.service.clone();
    let outcome = context
        .runtime
        .block_on(context.session.submit(service.as_ref()))?;
    let id = outcome.listing_id();
    match outcome {
        SubmissionOutcome::Created(_) => output::info(format!("Listing id: {id}")),
        SubmissionOutcome::Updated(_) => output::info(format!("Updated listing id: {id}")),
    }
    output::hint("Use `new` to start another listing.");
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section("Listing Wizard");
    output::detail(format!("Version   : {}", meta.version));
    output::detail(format!("Commit    : {} ({})", meta.git_hash, meta.git_status));
    output::detail(format!("Built     : {}", meta.timestamp));
    output::detail(format!("Profile   : {}", meta.profile));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let [name] = args {
        let name = name.to_ascii_lowercase();
        let Some(entry) = context
            .registry
            .iter()
            .find(|entry| {
                entry.name == name || entry.aliases.iter().any(|alias| *alias == name)
            })
        else {
            context.suggest_command(&name);
            return Ok(());
        };
        output::info(format!("{} - {}", entry.usage, entry.description));
        if entry.name == "set" {
            let keys: Vec<&str> = TEXT_FIELDS.iter().map(|(key, _)| *key).collect();
            output::detail(format!(
                "Fields: {}, rent, property_type, furnishing, ownership",
                keys.join(", ")
            ));
        }
        if entry.name == "poi" {
            for category in PoiCategory::ALL {
                output::detail(format!(
                    "{category}: {}",
                    category.vocabulary().join(", ")
                ));
            }
        }
        return Ok(());
    }

    output::section("Commands");
    for entry in &context.registry {
        output::detail(format!("{:<44} {}", entry.usage, entry.description));
    }
    output::hint(format!(
        "Steps run from {} to {}.",
        WizardStep::GoalAndType,
        WizardStep::ProximityUtility
    ));
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.teardown();
    Err(CommandError::ExitRequested)
}
