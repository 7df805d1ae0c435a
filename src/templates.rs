pub const ADDRESS_BOOK_JSON: &str = include_str!("../templates/address_book.json");
pub const CONTRACT_SOL: &str = include_str!("../templates/contract.sol.tmpl");
pub const SETUP_FUNCTIONS_SOL: &str = include_str!("../templates/setup_functions.sol.tmpl");
pub const UPDATE_FUNCTIONS_SOL: &str = include_str!("../templates/update_functions.sol.tmpl");
