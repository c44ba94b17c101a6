use clap::CommandFactory;

use super::*;

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn parses_crawl_sitemap_with_overrides() {
    let cli = Cli::try_parse_from([
        "trophy-guides",
        "--db",
        "/tmp/g.db",
        "crawl",
        "sitemap",
        "--site",
        "ppx",
        "--url",
        "https://www.powerpyx.com/sitemap.xml",
        "--batch-size",
        "20",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(cli.db, Some(PathBuf::from("/tmp/g.db")));
    match cli.command {
        Commands::Crawl {
            action: CrawlAction::Sitemap { site, url, args },
        } => {
            assert_eq!(site, GuideSite::PowerPyx);
            assert_eq!(url, "https://www.powerpyx.com/sitemap.xml");
            assert_eq!(args.batch_size, Some(20));
            assert!(args.dry_run);
            assert!(!args.force_lock);
        }
        _ => panic!("expected crawl sitemap"),
    }
}

#[test]
fn rejects_unknown_site() {
    let result = Cli::try_parse_from([
        "trophy-guides",
        "crawl",
        "csv",
        "--site",
        "gamefaqs",
        "--file",
        "list.csv",
    ]);
    assert!(result.is_err());
}

#[test]
fn global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["trophy-guides", "rematch", "--site", "psnp", "-v"]).unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Rematch { site, dry_run, .. } => {
            assert_eq!(site, Some(GuideSite::PsnProfiles));
            assert!(!dry_run);
        }
        _ => panic!("expected rematch"),
    }
}

#[test]
fn quiet_and_verbose_conflict() {
    assert!(Cli::try_parse_from(["trophy-guides", "--quiet", "-v", "stats"]).is_err());
}
