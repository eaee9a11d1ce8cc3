/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

// Extracts a typed link field or fails with the wire relation name. Absence
// of a relation means the operation is illegal for the resource right now.
macro_rules! require_link {
    ($link:expr, $rel:literal) => {
        $link
            .as_ref()
            .ok_or_else(|| crate::v0::errors::CtmsError::missing_link($rel))?
    };
}

pub(crate) use require_link;
