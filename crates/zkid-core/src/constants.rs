//! # Pipeline Constants
//!
//! Fixed widths shared by the codec, the commitment engine, the tree clients
//! and the circuit identifier resolver. Proving circuits are compiled against
//! these values; changing one changes every downstream circuit input.

/// Maximum number of forbidden-country codes packed into a disclosure input.
pub const MAX_FORBIDDEN_COUNTRIES: usize = 40;

/// Width of one country code in bytes.
pub const COUNTRY_CODE_LEN: usize = 3;

/// Bytes packed into one field element. 31 bytes always fit below the BN254
/// modulus.
pub const PACK_CHUNK_BYTES: usize = 31;

/// Depth of the registration (commitment) tree as seen by the circuits.
pub const REGISTRATION_TREE_DEPTH: usize = 33;

/// Depth the sanctions sparse Merkle tree proofs are padded to.
pub const SANCTIONS_TREE_DEPTH: usize = 64;

/// Largest RSA modulus accepted by the resolver.
pub const MAX_RSA_BITS: u32 = 4096;

/// Bit-length bucket appended to issuer-chain circuit names for RSA-family
/// keys.
pub const DSC_RSA_BUCKET_BITS: u32 = 4096;

/// Maximum number of inputs to a single Poseidon invocation.
pub const POSEIDON_MAX_ARITY: usize = 12;

/// RSA-PSS salt lengths tried by the resolver, in order.
pub const PSS_SALT_CANDIDATES: [usize; 5] = [32, 64, 48, 20, 0];

/// ASCII filler used in MRZ fields.
pub const MRZ_FILLER: char = '<';
