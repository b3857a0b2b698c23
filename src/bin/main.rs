use dotenv::dotenv;

use article_catalog::{app::*, error::*, forms::ArticleQuery};

fn run(cli: &clap::ArgMatches) -> Result<()> {
  let config = AppConfig::new_clap(cli)?;

  match cli.subcommand() {
    Some(("list", m)) => list::execute(config, m),
    Some(("show", m)) => show::execute(config, m),
    Some(("like", m)) => show::like(config, m),
    Some(("categories", _)) => taxonomy::categories(config),
    Some(("tags", _)) => taxonomy::tags(config),
    // default to 'list' command.
    _ => list::run(config, ArticleQuery::default()),
  }
}

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let yaml = clap::load_yaml!("main-cli.yml");
  let cli = clap::App::from_yaml(yaml).get_matches();

  match run(&cli) {
    Err(err) if err.is_user_facing() => {
      eprintln!("{}", err);
      std::process::exit(1);
    },
    res => res?,
  }
  log::info!("Main finished");
  Ok(())
}
