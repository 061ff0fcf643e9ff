//! Reversible campaign codes.
//! Code format: <WORD>-<NN>, e.g., CIPHER-42, MOLE-07

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for campaign codes
pub const WORD_LIST: [&str; 64] = [
    "CIPHER", "MOLE", "DOSSIER", "ASSET", "HANDLER", "COURIER", "BURNER", "SAFEHSE", "DEADDROP",
    "WIRETAP", "DECOY", "LEDGER", "CARTEL", "GUILD", "SYNDIC", "EMBASSY", "ENVOY", "TREATY",
    "ACCORD", "SANCTION", "EMBARGO", "BRIBE", "LEVERAGE", "DOUBLE", "SLEEPER", "CELL", "NETWORK",
    "SIGNAL", "STATIC", "BEACON", "RELAY", "ORBIT", "SHADOW", "VEIL", "MASK", "LANTERN", "COMPASS",
    "ANCHOR", "HARBOR", "CITADEL", "BASTION", "OUTPOST", "ARSENAL", "FOUNDRY", "FORGE", "VAULT",
    "ARCHIVE", "CODEX", "RUNE", "OMEN", "ORACLE", "PROPHET", "HERALD", "SENTRY", "WARDEN",
    "MARSHAL", "REGENT", "CONSUL", "TRIBUNE", "PRAETOR", "LEGATE", "PATRON", "BROKER", "FIXER",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    let nn = u8::try_from((packed >> 9) & 0x7F).unwrap_or(0);
    (packed & 0x01FF, nn)
}

fn compose_seed(word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let [lo, hi] = packed.to_le_bytes();
    let mut buf = [0u8; 8];
    buf[..5].copy_from_slice(b"FTA-C");
    buf[5] = lo;
    buf[6] = hi;
    buf[7] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Campaign code for a seed. Only the low 16 bits of the seed survive, so
/// seeds that did not come from `decode_code` map onto a nearby code.
#[must_use]
pub fn encode_code(seed: u64) -> String {
    let packed = u16::try_from(seed & 0xFFFF).unwrap_or(0);
    let (wi, nn) = unpack(packed);
    let word = WORD_LIST.get(usize::from(wi)).copied().unwrap_or(WORD_LIST[0]);
    format!("{word}-{:02}", nn % 100)
}

/// Seed for a campaign code, case-insensitive.
#[must_use]
pub fn decode_code(code: &str) -> Option<u64> {
    let (word_part, nn_part) = code.trim().rsplit_once('-')?;
    if nn_part.len() != 2 {
        return None;
    }
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some(compose_seed(wi, nn))
}

#[must_use]
pub fn code_from_entropy(entropy: u64) -> String {
    let len = u64::try_from(WORD_LIST.len()).unwrap_or(1);
    let wi = u16::try_from(entropy % len).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_code(compose_seed(wi, nn))
}
