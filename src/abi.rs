//! Contract bindings for the prize pool, its draw manager and the prize token.

#[allow(clippy::too_many_arguments)]
pub mod prize_pool {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface PrizePool {
            event ContributedReserve(address indexed user, uint256 amount);
            event ContributePrizeTokens(address indexed vault, uint24 indexed drawId, uint256 amount);

            function reserve() external view returns (uint256);
            function pendingReserveContributions() external view returns (uint256);
            function firstDrawOpensAt() external view returns (uint48);
            function prizeToken() external view returns (address);
            function drawManager() external view returns (address);
            function DONATOR() external view returns (address);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod draw_manager {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface DrawManager {
            event DrawStarted(
                address indexed sender,
                address indexed recipient,
                uint24 drawId,
                uint48 elapsedTime,
                uint256 reward,
                uint32 rngRequestId
            );
            event DrawFinished(
                address indexed sender,
                address indexed recipient,
                uint24 drawId,
                uint48 elapsedTime,
                uint256 reward,
                uint256 remainingReserve
            );
        }
    );
}

pub mod erc20 {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface ERC20 {
            function name() external view returns (string);
            function symbol() external view returns (string);
            function decimals() external view returns (uint8);
        }
    );
}
