//! User-facing status texts published by the holders.

pub const PROCESSING: &str = "Processing database query...";
pub const SAVE_SUCCESS: &str = "The item was successfully saved to the database.";
pub const SAVE_FAILURE: &str = "An error occurred while saving to the database. Please try again.";
pub const UPDATE_SUCCESS: &str = "Changes were successfully saved to the database.";
pub const DELETE_SUCCESS: &str = "The item was successfully deleted from the database.";
pub const ACTIVITY_DELETE_SUCCESS: &str = "The activity was successfully deleted.";
pub const DELETE_FAILURE: &str =
    "An error occurred while deleting the item. Please verify if it was removed or try again.";
pub const RETRIEVE_FAILURE: &str = "An error occurred while retrieving the data.";
pub const CORRUPTED_ITEM: &str = "Corrupted item. Please try again.";
