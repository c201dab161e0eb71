use clap::{Parser, Subcommand, ValueEnum};

use keysuggest::suggest::CorrectionMode;
use suggest_cli::commands::suggest_ops::SuggestOptions;
use suggest_cli::commands::{config_ops, dict_ops, suggest_ops};

#[derive(Parser)]
#[command(name = "dicttool", about = "Keyboard suggestion dictionary tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    None,
    Basic,
    Full,
    FullBigram,
}

impl From<Mode> for CorrectionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::None => CorrectionMode::None,
            Mode::Basic => CorrectionMode::Basic,
            Mode::Full => CorrectionMode::Full,
            Mode::FullBigram => CorrectionMode::FullBigram,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compile a word list (word<TAB>frequency) into a dictionary blob
    Compile {
        /// Word list file
        words_file: String,
        /// Output file
        output_file: String,
        /// Bigram list (word1<TAB>word2<TAB>frequency)
        #[arg(long)]
        bigrams: Option<String>,
    },
    /// Show dictionary or learned-table info (auto-detected by magic bytes)
    Info {
        /// Dictionary blob or learned table
        file: String,
    },
    /// Look up a word and the words that follow it
    Lookup {
        /// Dictionary file
        dict_file: String,
        /// Word to look up
        word: String,
    },
    /// Suggestions for a typed word
    Suggest {
        /// Dictionary file
        dict_file: String,
        /// Typed input
        input: String,
        /// Previously committed word (enables bigram suggestions)
        #[arg(long)]
        previous: Option<String>,
        /// Maximum number of suggestions
        #[arg(short, long)]
        max: Option<usize>,
        /// Correction mode
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Treat horizontal QWERTY neighbours as alternates of each key
        #[arg(long)]
        proximity: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            words_file,
            output_file,
            bigrams,
        } => dict_ops::compile(&words_file, bigrams.as_deref(), &output_file),
        Command::Info { file } => dict_ops::info(&file),
        Command::Lookup { dict_file, word } => dict_ops::lookup(&dict_file, &word),
        Command::Suggest {
            dict_file,
            input,
            previous,
            max,
            mode,
            proximity,
            json,
        } => {
            let opts = SuggestOptions {
                previous: previous.as_deref(),
                max,
                mode: mode.map(CorrectionMode::from),
                proximity,
                json,
            };
            suggest_ops::suggest_cmd(&dict_file, &input, &opts);
        }
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
