use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use frost_pallas_sdk::coordinator::{
    aggregate, new_signing_package, verify_randomized_signature, verify_signature, Message,
};
use frost_pallas_sdk::orchard::{OrchardFullViewingKey, OrchardSpendValidatingKey, ZcashNetwork};
use frost_pallas_sdk::participant::{generate_nonces_and_commitments, sign};
use frost_pallas_sdk::randomized::{
    randomized_params_from_public_key_and_signing_package, randomizer_from_params,
};
use frost_pallas_sdk::serialization::secret_share_to_json;
use frost_pallas_sdk::{
    trusted_dealer_keygen_from, verify_and_get_key_package_from, Configuration,
    ParticipantIdentifier,
};
use log::info;
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "frost-pallas")]
#[command(about = "FROST(Pallas, BLAKE2b-512) threshold signing demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a trusted dealer and print the shares and group key as JSON
    Dealer {
        #[arg(long, default_value = "2")]
        min: u16,
        #[arg(long, default_value = "3")]
        max: u16,
        /// Hex-encoded 32-byte secret to share instead of a fresh one
        #[arg(long)]
        secret: Option<String>,
    },
    /// Generate keys, sign with `min` participants and verify the result
    SignDemo {
        #[arg(long, default_value = "2")]
        min: u16,
        #[arg(long, default_value = "3")]
        max: u16,
        #[arg(short, long, default_value = "i am a message")]
        message: String,
        /// Sign under a re-randomized group key
        #[arg(long)]
        randomized: bool,
    },
    /// Build an Orchard UFVK and default address from a FROST group key
    OrchardFvk {
        /// Hex-encoded group verifying key, used as `ak`
        #[arg(long)]
        ak: String,
        /// Hex-encoded ZIP-32 seed for `nk` and `rivk`
        #[arg(long)]
        seed: String,
        #[arg(long, default_value = "testnet")]
        network: ZcashNetwork,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dealer { min, max, secret } => run_dealer(min, max, secret),
        Commands::SignDemo {
            min,
            max,
            message,
            randomized,
        } => run_sign_demo(min, max, message, randomized),
        Commands::OrchardFvk { ak, seed, network } => run_orchard_fvk(&ak, &seed, network),
    }
}

fn identifier_hex(identifier: &ParticipantIdentifier) -> Result<String> {
    serde_json::from_str(&identifier.data).context("identifier is not a JSON string")
}

fn run_dealer(min: u16, max: u16, secret: Option<String>) -> Result<()> {
    let secret = match secret {
        Some(secret) => hex::decode(secret).context("secret is not valid hex")?,
        None => Vec::new(),
    };
    let keygen = trusted_dealer_keygen_from(&Configuration {
        min_signers: min,
        max_signers: max,
        secret,
    })?;

    let mut shares = Map::new();
    for (identifier, share) in &keygen.secret_shares {
        let share_json: Value = serde_json::from_str(&secret_share_to_json(share)?)?;
        shares.insert(identifier_hex(identifier)?, share_json);
    }
    let mut verifying_shares = Map::new();
    for (identifier, share) in &keygen.public_key_package.verifying_shares {
        verifying_shares.insert(identifier_hex(identifier)?, Value::String(share.clone()));
    }

    let output = json!({
        "verifying_key": keygen.public_key_package.verifying_key,
        "verifying_shares": verifying_shares,
        "secret_shares": shares,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_sign_demo(min: u16, max: u16, message: String, randomized: bool) -> Result<()> {
    let keygen = trusted_dealer_keygen_from(&Configuration {
        min_signers: min,
        max_signers: max,
        secret: Vec::new(),
    })?;
    info!("dealer produced {} shares", keygen.secret_shares.len());

    let key_packages = keygen
        .secret_shares
        .values()
        .take(usize::from(min))
        .map(verify_and_get_key_package_from)
        .collect::<Result<Vec<_>, _>>()?;

    let mut nonces = Vec::new();
    let mut commitments = Vec::new();
    for key_package in &key_packages {
        let round1 = generate_nonces_and_commitments(key_package)?;
        nonces.push(round1.nonces);
        commitments.push(round1.commitments);
    }

    let message = Message {
        data: message.into_bytes(),
    };
    let signing_package = new_signing_package(&message, commitments)?;

    let randomizer = if randomized {
        let params = randomized_params_from_public_key_and_signing_package(
            &keygen.public_key_package,
            &signing_package,
        )?;
        println!("randomized key: {}", params.randomized_verifying_key());
        Some(randomizer_from_params(&params)?)
    } else {
        None
    };

    let shares = nonces
        .into_iter()
        .zip(&key_packages)
        .map(|(nonces, key_package)| {
            sign(&signing_package, nonces, key_package, randomizer.as_ref())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let signature = aggregate(
        &signing_package,
        shares,
        &keygen.public_key_package,
        randomizer.as_ref(),
    )?;

    match &randomizer {
        Some(randomizer) => verify_randomized_signature(
            randomizer,
            &message,
            &signature,
            &keygen.public_key_package,
        )?,
        None => verify_signature(&message, &signature, &keygen.public_key_package)?,
    }

    println!("group key: {}", keygen.public_key_package.verifying_key);
    println!("signature: {}", hex::encode(&signature.data));
    println!("signature verified");
    Ok(())
}

fn run_orchard_fvk(ak: &str, seed: &str, network: ZcashNetwork) -> Result<()> {
    let ak = hex::decode(ak).context("ak is not valid hex")?;
    let seed = hex::decode(seed).context("seed is not valid hex")?;

    let ak = OrchardSpendValidatingKey::from_bytes(&ak)
        .map_err(|error| anyhow!("invalid ak: {error}"))?;
    let fvk = OrchardFullViewingKey::new_from_validating_key_and_seed(&ak, &seed, network)?;
    let address = fvk.derive_address()?;

    println!("ufvk: {}", fvk.encode()?);
    println!("address: {}", address.string_encoded());
    Ok(())
}
