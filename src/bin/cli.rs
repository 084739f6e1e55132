use chrono::{Datelike, NaiveDate, Weekday};
use pass_planner::{
    AppConfig, AppContext, ComparisonKind, DayClassifier, DayRule, LicensePlan, OverrideSet,
    OverrideState, PassKind, Settings, SimulationOutcome, SimulationRequest, UsFederalCalendar,
    WeekStart, classify_calendar, date_key, export_calendar_to_csv, export_calendar_to_json,
    national_holiday_set, parse_date_key, run_simulation, stash_outcome, take_stashed_outcome,
};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::str::FromStr;

/// Strict amount parsing for form fields: digits only, no leading zeros.
fn parse_amount(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if input.len() > 1 && input.starts_with('0') {
        return None;
    }
    input.parse().ok()
}

fn parse_weekday(input: &str) -> Option<Weekday> {
    match input.trim().to_ascii_lowercase().as_str() {
        "sun" | "sunday" => Some(Weekday::Sun),
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

fn parse_pass_kind(input: &str) -> Option<PassKind> {
    match input.trim() {
        "1" => Some(PassKind::Monthly),
        "3" => Some(PassKind::ThreeMonth),
        "6" => Some(PassKind::SixMonth),
        _ => None,
    }
}

fn rule_label(rule: DayRule) -> &'static str {
    match rule {
        DayRule::Work => "work",
        DayRule::WeeklyHoliday => "weekly_holiday",
        DayRule::BiweeklyOddHoliday => "biweekly_odd_holiday",
        DayRule::BiweeklyEvenHoliday => "biweekly_even_holiday",
    }
}

fn comparison_label(kind: ComparisonKind) -> &'static str {
    match kind {
        ComparisonKind::AllTickets => "single tickets only",
        ComparisonKind::Baseline => "longest pass renewed",
        ComparisonKind::ShortestPassOnFirst => "shortest pass on the 1st",
        ComparisonKind::Optimal => "optimal schedule",
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the current form state\n  fare <amount>                      Set the one-way fare\n  pass <1|3|6> <price|off>           Enable a pass duration with its price, or disable it\n  start <YYYY-MM-DD>                 Set the simulation start date\n  months <n>                         Set the simulation duration (clamped to the license plan)\n  rule <weekday> <rule>              Set a weekday rule (work, weekly_holiday,\n                                     biweekly_odd_holiday, biweekly_even_holiday)\n  weekstart <sunday|monday>          Set the week numbering start day\n  national <on|off>                  Include national holidays\n  toggle <YYYY-MM-DD>                Flip a date against its natural classification\n  clear <YYYY-MM-DD>                 Remove any override on a date\n  overrides                          List forced holidays and forced workdays\n  holidays                           List the optimization-window holidays\n  export <csv|json> <path>           Export the resolved calendar to disk\n  calc                               Run the cost calculation\n  result                             Show and consume the last stashed result\n  license show                       Show the active license plan\n  license set <plan> <key> <expiry>  Activate a license plan (free|standard|pro)\n  quit|exit                          Exit"
    );
}

fn print_request(request: &SimulationRequest, plan: LicensePlan) {
    println!(
        "Fare               : {}",
        if request.fare > 0 {
            request.fare.to_string()
        } else {
            "(unset)".to_string()
        }
    );
    for kind in PassKind::ALL {
        let label = format!("{kind}");
        match request.passes.price(kind) {
            Some(price) => println!("{label:<19}: {price}"),
            None => println!("{label:<19}: off"),
        }
    }
    println!(
        "Start date         : {}",
        request
            .start_date
            .map(date_key)
            .unwrap_or_else(|| "(unset)".to_string())
    );
    println!(
        "Duration           : {} months (plan '{}', max {})",
        request.duration_months,
        plan,
        plan.max_duration_months()
    );
    for weekday in [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ] {
        let name = weekday.to_string();
        println!("  {name:<17}: {}", rule_label(request.rules.rule(weekday)));
    }
    println!(
        "Week start         : {}",
        match request.week_start {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    );
    println!(
        "National holidays  : {}",
        if request.include_national_holidays {
            "on"
        } else {
            "off"
        }
    );
    println!(
        "Overrides          : {} forced holidays, {} forced workdays",
        request.overrides.forced_holidays().len(),
        request.overrides.forced_workdays().len()
    );
}

fn print_outcome(outcome: &SimulationOutcome) {
    println!(
        "Optimal cost       : {}{}",
        outcome.plan.total_cost,
        if outcome.from_cache { " (cached)" } else { "" }
    );
    if outcome.plan.purchase_path.is_empty() {
        println!("Purchases          : none (tickets only)");
    } else {
        println!("Purchases          :");
        for step in &outcome.plan.purchase_path {
            println!("  {}  {}-month pass", date_key(step.date), step.months);
        }
    }
    for cost in &outcome.plan.comparison_costs {
        let savings = cost.amount - outcome.plan.total_cost;
        println!(
            "  {:<24} {:>10}  (saves {})",
            comparison_label(cost.kind),
            cost.amount,
            savings
        );
    }
    println!(
        "Window holidays    : {}",
        outcome
            .parameters
            .holidays
            .split(',')
            .filter(|key| !key.is_empty())
            .count()
    );
}

/// What the date would be under the national and weekday layers alone,
/// before any override is applied.
fn baseline_is_holiday(
    request: &SimulationRequest,
    context: &AppContext,
    date: NaiveDate,
) -> bool {
    let year_start =
        NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("January 1 exists in every year");
    let year_end =
        NaiveDate::from_ymd_opt(date.year(), 12, 31).expect("December 31 exists in every year");
    let national = if request.include_national_holidays {
        national_holiday_set(context.holidays(), year_start, year_end)
    } else {
        BTreeSet::new()
    };
    let no_overrides = OverrideSet::new();
    DayClassifier::new(&request.rules, &no_overrides, &national, request.week_start)
        .baseline_is_holiday(date)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let db_path =
        std::env::var("PASS_PLANNER_DB").unwrap_or_else(|_| "pass-planner.db".to_string());
    let settings = match Settings::open(&db_path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Could not open the settings store at {db_path}: {err}");
            return;
        }
    };
    let config = AppConfig::from_env();
    let context = match AppContext::new(&config, settings, Box::new(UsFederalCalendar::new())) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("Could not build the HTTP client: {err}");
            return;
        }
    };
    let mut request = match context.settings().simulation_request() {
        Ok(request) => request,
        Err(err) => {
            eprintln!("Could not restore saved preferences ({err}); starting fresh");
            SimulationRequest::default()
        }
    };

    println!("Pass Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => {
                let plan = context
                    .settings()
                    .license_plan()
                    .ok()
                    .flatten()
                    .unwrap_or_default();
                print_request(&request, plan);
            }
            "fare" => match parts.next().and_then(parse_amount) {
                Some(amount) if amount > 0 => {
                    request.fare = amount;
                    if let Err(err) = context.settings().set_fare(amount) {
                        println!("Warning: fare not persisted: {err}");
                    }
                    println!("Fare set to {amount}.");
                }
                _ => println!("Usage: fare <positive amount, no leading zeros>"),
            },
            "pass" => {
                let kind = parts.next().and_then(parse_pass_kind);
                let value = parts.next();
                match (kind, value) {
                    (Some(kind), Some("off")) => {
                        request.passes.set_price(kind, None);
                        if let Err(err) = context.settings().set_pass(kind, None) {
                            println!("Warning: pass setting not persisted: {err}");
                        }
                        println!("{kind} disabled.");
                    }
                    (Some(kind), Some(price_s)) => match parse_amount(price_s) {
                        Some(price) if price > 0 => {
                            request.passes.set_price(kind, Some(price));
                            if let Err(err) = context.settings().set_pass(kind, Some(price)) {
                                println!("Warning: pass setting not persisted: {err}");
                            }
                            println!("{kind} set to {price}.");
                        }
                        _ => println!("Invalid price (positive, no leading zeros)"),
                    },
                    _ => println!("Usage: pass <1|3|6> <price|off>"),
                }
            }
            "start" => match parts.next().and_then(parse_date_key) {
                Some(date) => {
                    request.start_date = Some(date);
                    if let Err(err) = context.settings().set_start_date(date) {
                        println!("Warning: start date not persisted: {err}");
                    }
                    println!("Start date set to {}.", date_key(date));
                }
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "months" => match parts.next().and_then(parse_amount) {
                Some(months) if months > 0 => {
                    let plan = context
                        .settings()
                        .license_plan()
                        .ok()
                        .flatten()
                        .unwrap_or_default();
                    let clamped = plan.clamp_duration(months);
                    if clamped != months {
                        println!(
                            "The '{plan}' plan allows at most {} months; using {clamped}.",
                            plan.max_duration_months()
                        );
                    }
                    request.duration_months = clamped;
                    if let Err(err) = context.settings().set_duration_months(clamped) {
                        println!("Warning: duration not persisted: {err}");
                    }
                    println!("Duration set to {clamped} months.");
                }
                _ => println!("Usage: months <positive count, no leading zeros>"),
            },
            "rule" => {
                let weekday = parts.next().and_then(parse_weekday);
                let rule = parts.next().and_then(|s| DayRule::from_str(s).ok());
                match (weekday, rule) {
                    (Some(weekday), Some(rule)) => {
                        request.rules.set_rule(weekday, rule);
                        if let Err(err) = context.settings().set_weekday_rules(&request.rules) {
                            println!("Warning: rules not persisted: {err}");
                        }
                        println!("{weekday} set to {}.", rule_label(rule));
                    }
                    _ => println!(
                        "Usage: rule <weekday> <work|weekly_holiday|biweekly_odd_holiday|biweekly_even_holiday>"
                    ),
                }
            }
            "weekstart" => match parts.next().and_then(|s| WeekStart::from_str(s).ok()) {
                Some(week_start) => {
                    request.week_start = week_start;
                    if let Err(err) = context.settings().set_week_start(week_start) {
                        println!("Warning: week start not persisted: {err}");
                    }
                    println!("Week numbering starts on {:?}.", week_start);
                }
                None => println!("Usage: weekstart <sunday|monday>"),
            },
            "national" => match parts.next() {
                Some(value @ ("on" | "off")) => {
                    let include = value == "on";
                    request.include_national_holidays = include;
                    if let Err(err) = context.settings().set_include_national_holidays(include) {
                        println!("Warning: national holiday flag not persisted: {err}");
                    }
                    println!(
                        "National holidays {}.",
                        if include { "included" } else { "excluded" }
                    );
                }
                _ => println!("Usage: national <on|off>"),
            },
            "toggle" => match parts.next().and_then(parse_date_key) {
                Some(date) => {
                    let baseline = baseline_is_holiday(&request, &context, date);
                    let state = request.overrides.toggle(date, baseline);
                    if let Err(err) = context.settings().save_overrides(&request.overrides) {
                        println!("Warning: overrides not persisted: {err}");
                    }
                    match state {
                        OverrideState::Unset => {
                            println!("{} back to its natural state.", date_key(date))
                        }
                        OverrideState::ForcedHoliday => {
                            println!("{} forced to holiday.", date_key(date))
                        }
                        OverrideState::ForcedWorkday => {
                            println!("{} forced to workday.", date_key(date))
                        }
                    }
                }
                None => println!("Usage: toggle <YYYY-MM-DD>"),
            },
            "clear" => match parts.next().and_then(parse_date_key) {
                Some(date) => {
                    if request.overrides.clear(date) {
                        if let Err(err) = context.settings().save_overrides(&request.overrides) {
                            println!("Warning: overrides not persisted: {err}");
                        }
                        println!("Override on {} removed.", date_key(date));
                    } else {
                        println!("No override on {}.", date_key(date));
                    }
                }
                None => println!("Usage: clear <YYYY-MM-DD>"),
            },
            "overrides" => {
                println!("Forced holidays:");
                for date in request.overrides.forced_holidays() {
                    println!("  {}", date_key(*date));
                }
                println!("Forced workdays:");
                for date in request.overrides.forced_workdays() {
                    println!("  {}", date_key(*date));
                }
            }
            "holidays" => {
                let lists = pass_planner::generate_holiday_lists(
                    request.start_date,
                    request.duration_months,
                    &request.rules,
                    &request.overrides,
                    context.holidays(),
                    request.include_national_holidays,
                    request.week_start,
                );
                println!(
                    "{} holidays in the simulation window:",
                    lists.optimization.len()
                );
                for date in &lists.optimization {
                    println!("  {}", date_key(*date));
                }
            }
            "export" => {
                let format = parts.next();
                let path = parts.next();
                match (format, path) {
                    (Some(format @ ("csv" | "json")), Some(path)) => {
                        let days = classify_calendar(
                            request.start_date,
                            request.duration_months,
                            &request.rules,
                            &request.overrides,
                            context.holidays(),
                            request.include_national_holidays,
                            request.week_start,
                        );
                        if days.is_empty() {
                            println!("Nothing to export: set a start date and duration first.");
                            continue;
                        }
                        let result = if format == "csv" {
                            export_calendar_to_csv(&days, path)
                        } else {
                            export_calendar_to_json(&days, path)
                        };
                        match result {
                            Ok(()) => println!("Calendar exported to {path}."),
                            Err(err) => println!("Export failed: {err}"),
                        }
                    }
                    _ => println!("Usage: export <csv|json> <path>"),
                }
            }
            "calc" => match run_simulation(&context, &request).await {
                Ok(outcome) => {
                    print_outcome(&outcome);
                    if let Err(err) = stash_outcome(&context, &outcome) {
                        println!("Warning: result not stashed: {err}");
                    }
                }
                Err(err) => println!("Error: {err}"),
            },
            "result" => match take_stashed_outcome(&context) {
                Ok(Some(outcome)) => print_outcome(&outcome),
                Ok(None) => println!("No stashed result."),
                Err(err) => println!("Error: {err}"),
            },
            "license" => match parts.next() {
                Some("show") => {
                    let plan = context
                        .settings()
                        .license_plan()
                        .ok()
                        .flatten()
                        .unwrap_or_default();
                    println!(
                        "Plan '{plan}', up to {} months.",
                        plan.max_duration_months()
                    );
                }
                Some("set") => {
                    let plan = parts.next().and_then(|s| LicensePlan::from_str(s).ok());
                    let key = parts.next();
                    let expiry = parts.next();
                    match (plan, key, expiry) {
                        (Some(plan), Some(key), Some(expiry)) => {
                            match context.settings().set_license(plan, key, expiry) {
                                Ok(()) => println!("License plan '{plan}' activated."),
                                Err(err) => println!("Error: {err}"),
                            }
                        }
                        _ => println!("Usage: license set <free|standard|pro> <key> <expiry>"),
                    }
                }
                _ => println!("Usage: license <show|set ...>"),
            },
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
