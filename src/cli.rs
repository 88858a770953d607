//! Command-line argument parsing for workdays

/// Parse command line arguments
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub validate: bool,
    pub help: bool,
    pub days: Option<String>,
    pub hours: Option<String>,
    pub date: Option<String>,
}

impl Args {
    /// One calculation on the command line instead of running the server
    pub fn is_one_shot(&self) -> bool {
        self.days.is_some() || self.hours.is_some() || self.date.is_some()
    }
}

pub fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from(&args)
}

/// Parse an argument vector whose first element is the program name
pub fn parse_args_from(args: &[String]) -> Args {
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--validate" => result.validate = true,
            "--help" | "-h" => result.help = true,
            flag @ ("--days" | "--hours" | "--date") => {
                let value = args.get(i + 1).cloned();
                if value.is_some() {
                    i += 1;
                }
                // A flag without a value still selects one-shot mode and fails validation
                let value = Some(value.unwrap_or_default());
                match flag {
                    "--days" => result.days = value,
                    "--hours" => result.hours = value,
                    _ => result.date = value,
                }
            }
            _ => {}
        }
        i += 1;
    }

    result
}

pub fn print_help() {
    println!("workdays - Business calendar date calculator\n");
    println!("USAGE:");
    println!("    workdays [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --days N                Add N working days, print the result and exit");
    println!("    --hours H               Add H working hours (decimals allowed)");
    println!("    --date ISO              Start instant (default: now, UTC)");
    println!("    --validate              Validate configuration and exit");
    println!("    --help, -h              Show this help message\n");
    println!("Without --days/--hours/--date the HTTP server is started:");
    println!("    GET /calculate-date?days=N&hours=H&date=ISO\n");
    println!("ENVIRONMENT:");
    println!("    HOLIDAYS_URL            Holiday source (required)");
    println!("    PORT                    HTTP port (default: 3000)");
    println!("    HOLIDAYS_TIMEOUT_SECS   Holiday fetch timeout (default: 10)");
    println!("    BUSINESS_UTC_OFFSET     Business zone offset (default: -05:00)");
}
